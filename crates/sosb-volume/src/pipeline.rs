use sosb_core::{AnalysisRequest, Brand, SearchSettings, ShareReport};

use crate::error::AnalysisError;
use crate::source::VolumeSource;

/// Runs one share-of-search analysis: validate, fetch, aggregate, project.
///
/// Validation happens before the source is called, so an invalid request
/// never costs an API call. A source failure aborts the run; no partial
/// report is produced.
///
/// # Errors
///
/// - [`AnalysisError::Validation`] if the brands or settings are rejected.
/// - [`AnalysisError::Source`] if the volume source fails.
pub async fn run_analysis<S>(
    source: &S,
    brands: &[Brand],
    settings: SearchSettings,
) -> Result<ShareReport, AnalysisError>
where
    S: VolumeSource + Sync,
{
    let request = AnalysisRequest::new(brands, settings)?;
    let brand_count = request.qualifying_brands().count();
    tracing::info!(
        source = source.name(),
        brands = brand_count,
        from = %request.settings().date_from,
        to = %request.settings().date_to,
        granularity = %request.settings().granularity,
        "starting share-of-search run"
    );

    let observations = source.fetch(&request).await.inspect_err(|e| {
        tracing::error!(source = source.name(), error = %e, "volume source failed");
    })?;

    Ok(request.build_report(&observations))
}

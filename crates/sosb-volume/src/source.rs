use std::future::Future;

use sosb_core::{AnalysisRequest, AppConfig, RawVolumeObservation, SourceKind};

use crate::error::SourceError;
use crate::google_ads::{GoogleAdsConfig, GoogleAdsSource};
use crate::synthetic::SyntheticSource;

/// Supplier of raw volume observations for one validated request.
///
/// A source returns the complete set of observations for the run or an
/// error; partial results are never handed to the aggregation engine.
pub trait VolumeSource {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn fetch(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<Vec<RawVolumeObservation>, SourceError>> + Send;
}

/// The source selected by `SOSB_SOURCE`, resolved once at startup.
pub enum ConfiguredSource {
    Synthetic(SyntheticSource),
    GoogleAds(Box<GoogleAdsSource>),
}

impl ConfiguredSource {
    /// Builds the source named by `config.source`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredentials`] when the Google Ads source
    /// is selected without its credentials, or [`SourceError::Http`] if its
    /// HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SourceError> {
        match config.source {
            SourceKind::Synthetic => Ok(Self::Synthetic(SyntheticSource::new(config.synthetic_seed))),
            SourceKind::GoogleAds => {
                let ads_config = GoogleAdsConfig::from_app_config(config)?;
                Ok(Self::GoogleAds(Box::new(GoogleAdsSource::new(ads_config)?)))
            }
        }
    }
}

impl VolumeSource for ConfiguredSource {
    fn name(&self) -> &'static str {
        match self {
            Self::Synthetic(source) => source.name(),
            Self::GoogleAds(source) => source.name(),
        }
    }

    async fn fetch(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Vec<RawVolumeObservation>, SourceError> {
        match self {
            Self::Synthetic(source) => source.fetch(request).await,
            Self::GoogleAds(source) => source.fetch(request).await,
        }
    }
}

//! `POST /api/v1/share-of-search`: runs one analysis and returns its report.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use sosb_core::{load_brands, Brand, SearchSettings, ShareReport};
use sosb_volume::run_analysis;

use crate::middleware::RequestId;

use super::{map_analysis_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Omitted `brands` fall back to the configured registry; omitted `settings`
/// fall back to today's defaults.
#[derive(Debug, Deserialize)]
pub(in crate::api) struct ShareOfSearchRequest {
    #[serde(default)]
    pub brands: Option<Vec<Brand>>,
    #[serde(default)]
    pub settings: Option<SearchSettings>,
}

pub(in crate::api) async fn run_share_of_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ShareOfSearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ShareReport>>, ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    let brands = match body.brands {
        Some(brands) => brands,
        None => {
            load_brands(&state.config.brands_path)
                .map_err(|e| {
                    tracing::error!(error = %e, "failed to load brand registry");
                    ApiError::new(
                        req_id.0.clone(),
                        "internal_error",
                        "brand registry unavailable",
                    )
                })?
                .brands
        }
    };
    let settings = body
        .settings
        .unwrap_or_else(|| SearchSettings::default_as_of(Utc::now().date_naive()));

    let report = run_analysis(state.source.as_ref(), &brands, settings)
        .await
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

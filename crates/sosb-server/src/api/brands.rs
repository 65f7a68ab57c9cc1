//! `GET /api/v1/brands`: the configured brand registry with colors assigned.

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use sosb_core::{assign_colors, load_brands, Brand};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(in crate::api) struct BrandItem {
    #[serde(flatten)]
    pub brand: Brand,
    pub qualifying: bool,
}

pub(in crate::api) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<BrandItem>>>, ApiError> {
    let registry = load_brands(&state.config.brands_path).map_err(|e| {
        tracing::error!(
            path = %state.config.brands_path.display(),
            error = %e,
            "failed to load brand registry"
        );
        ApiError::new(req_id.0.clone(), "internal_error", "brand registry unavailable")
    })?;

    let data = assign_colors(&registry.brands)
        .into_iter()
        .map(|brand| BrandItem {
            qualifying: brand.is_qualifying(),
            brand,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

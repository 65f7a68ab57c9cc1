use axum::{Extension, Json};
use chrono::Utc;
use sosb_core::SearchSettings;

use crate::middleware::RequestId;

use super::{ApiResponse, ResponseMeta};

/// `GET /api/v1/settings/defaults`: what a fresh form starts from today.
pub(in crate::api) async fn default_settings(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SearchSettings>> {
    Json(ApiResponse {
        data: SearchSettings::default_as_of(Utc::now().date_naive()),
        meta: ResponseMeta::new(req_id.0),
    })
}

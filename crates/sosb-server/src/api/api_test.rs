use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use sosb_core::{Environment, GoogleAdsCredentials, SourceKind, ValidationError};
use sosb_volume::SyntheticSource;
use tower::ServiceExt;
use uuid::Uuid;

use super::*;

const REGISTRY: &str = "\
brands:
  - name: Acme
    is_own_brand: true
    keywords: [acme, acme store]
  - name: Globex
    keywords: [globex]
    color: \"#123456\"
  - name: Draft
    keywords: ['']
";

fn write_registry(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sosb-brands-{}.yaml", Uuid::new_v4()));
    std::fs::write(&path, contents).expect("write brands file");
    path
}

fn test_state(brands_path: PathBuf) -> AppState {
    let config = AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "info".to_string(),
        brands_path,
        source: SourceKind::Synthetic,
        synthetic_seed: 7,
        ads_request_timeout_secs: 30,
        ads_max_retries: 3,
        ads_retry_backoff_base_ms: 1_000,
        ads_max_concurrent_brands: 2,
        google_ads: GoogleAdsCredentials::default(),
    };
    AppState {
        config: Arc::new(config),
        source: Arc::new(ConfiguredSource::Synthetic(SyntheticSource::new(7))),
    }
}

fn test_app(brands_path: PathBuf) -> Router {
    let auth = AuthState::from_keys(None, true).expect("auth");
    build_app(test_state(brands_path), auth, default_rate_limit_state())
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_source_error_maps_to_bad_gateway() {
    let response = ApiError::new("req-1", "source_error", "upstream failed").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn analysis_errors_map_to_their_codes() {
    let validation = map_analysis_error(
        "req-1".to_string(),
        &AnalysisError::Validation(ValidationError::NoQualifyingBrands),
    );
    assert_eq!(validation.error.code, "validation_error");

    let quota = map_analysis_error(
        "req-2".to_string(),
        &AnalysisError::Source(SourceError::QuotaExceeded("RESOURCE_EXHAUSTED".to_string())),
    );
    assert_eq!(quota.error.code, "source_error");
    assert!(quota.error.message.contains("quota"));

    let auth = map_analysis_error(
        "req-3".to_string(),
        &AnalysisError::Source(SourceError::Auth("invalid_grant".to_string())),
    );
    assert!(!auth.error.message.contains("invalid_grant"));
}

#[tokio::test]
async fn health_reports_the_configured_source() {
    let app = test_app(PathBuf::from("missing.yaml"));
    let response = app
        .oneshot(get_request("/api/v1/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["source"], "synthetic");
}

#[tokio::test]
async fn brands_lists_registry_with_colors_and_qualification() {
    let app = test_app(write_registry(REGISTRY));
    let response = app
        .oneshot(get_request("/api/v1/brands"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let brands = json["data"].as_array().expect("data array");
    assert_eq!(brands.len(), 3);
    assert_eq!(brands[0]["name"], "Acme");
    assert_eq!(brands[0]["color"], sosb_core::PALETTE[0]);
    assert_eq!(brands[0]["qualifying"], true);
    assert_eq!(brands[1]["color"], "#123456");
    assert_eq!(brands[2]["qualifying"], false);
}

#[tokio::test]
async fn brands_with_missing_registry_is_internal_error() {
    let app = test_app(std::env::temp_dir().join("sosb-does-not-exist.yaml"));
    let response = app
        .oneshot(get_request("/api/v1/brands"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "internal_error");
}

#[tokio::test]
async fn settings_defaults_are_monthly_for_the_last_twelve_months() {
    let app = test_app(PathBuf::from("missing.yaml"));
    let response = app
        .oneshot(get_request("/api/v1/settings/defaults"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["granularity"], "monthly");
    assert_eq!(json["data"]["network"], "google");
    assert_eq!(json["data"]["location"], "United States");
}

#[tokio::test]
async fn share_of_search_returns_report_for_explicit_input() {
    let app = test_app(PathBuf::from("missing.yaml"));
    let body = serde_json::json!({
        "brands": [
            { "name": "Acme", "is_own_brand": true, "keywords": ["acme"] },
            { "name": "Globex", "keywords": ["globex", "globex corp"] }
        ],
        "settings": {
            "location": "United States",
            "language": "English",
            "network": "google",
            "date_from": "2023-01-01",
            "date_to": "2023-03-31",
            "granularity": "monthly"
        }
    });
    let response = app
        .oneshot(post_json("/api/v1/share-of-search", &body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let results = json["data"]["results"].as_array().expect("results");
    assert_eq!(results.len(), 6);
    assert_eq!(json["data"]["pivot"].as_array().expect("pivot").len(), 3);

    for period in ["2023-01", "2023-02", "2023-03"] {
        let total: f64 = results
            .iter()
            .filter(|r| r["period"] == period)
            .map(|r| r["share"].as_f64().expect("share"))
            .sum();
        assert!((total - 100.0).abs() <= 0.1 + 1e-9, "{period}: {total}");
    }
}

#[tokio::test]
async fn share_of_search_falls_back_to_registry_brands() {
    let app = test_app(write_registry(REGISTRY));
    let body = serde_json::json!({
        "settings": {
            "location": "United States",
            "language": "English",
            "network": "both",
            "date_from": "2022-01-01",
            "date_to": "2022-12-31",
            "granularity": "yearly"
        }
    });
    let response = app
        .oneshot(post_json("/api/v1/share-of-search", &body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let brands: Vec<&str> = json["data"]["brands"]
        .as_array()
        .expect("brands")
        .iter()
        .filter_map(|b| b["name"].as_str())
        .collect();
    assert_eq!(brands, ["Acme", "Globex"]);
}

#[tokio::test]
async fn share_of_search_rejects_inverted_range() {
    let app = test_app(PathBuf::from("missing.yaml"));
    let body = serde_json::json!({
        "brands": [{ "name": "Acme", "keywords": ["acme"] }],
        "settings": {
            "location": "United States",
            "language": "English",
            "network": "google",
            "date_from": "2024-01-01",
            "date_to": "2023-01-01",
            "granularity": "monthly"
        }
    });
    let mut request = post_json("/api/v1/share-of-search", &body);
    request
        .headers_mut()
        .insert("x-request-id", "req-inverted".parse().unwrap());
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["meta"]["request_id"], "req-inverted");
}

#[tokio::test]
async fn share_of_search_rejects_brands_without_keywords() {
    let app = test_app(PathBuf::from("missing.yaml"));
    let body = serde_json::json!({
        "brands": [{ "name": "Acme", "keywords": ["   "] }]
    });
    let response = app
        .oneshot(post_json("/api/v1/share-of-search", &body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn share_of_search_rejects_malformed_body() {
    let app = test_app(PathBuf::from("missing.yaml"));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/share-of-search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"brands\": 5"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn protected_routes_require_bearer_token_when_enabled() {
    let auth = AuthState::from_keys(Some("secret-key"), false).expect("auth");
    let app = build_app(
        test_state(PathBuf::from("missing.yaml")),
        auth,
        default_rate_limit_state(),
    );

    let rejected = app
        .clone()
        .oneshot(get_request("/api/v1/settings/defaults"))
        .await
        .expect("response");
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(rejected).await;
    assert_eq!(json["error"]["code"], "unauthorized");
    assert!(json["meta"]["request_id"].as_str().is_some_and(|id| !id.is_empty()));

    let accepted = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/settings/defaults")
                .header(header::AUTHORIZATION, "Bearer secret-key")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(accepted.status(), StatusCode::OK);

    let health = app
        .oneshot(get_request("/api/v1/health"))
        .await
        .expect("response");
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn share_of_search_rejects_years_beyond_four_digits() {
    let app = test_app(PathBuf::from("missing.yaml"));
    let body = serde_json::json!({
        "brands": [{ "name": "Acme", "keywords": ["acme"] }],
        "settings": {
            "location": "United States",
            "language": "English",
            "network": "google",
            "date_from": "+10000-01-01",
            "date_to": "+10001-12-31",
            "granularity": "yearly"
        }
    });
    let response = app
        .oneshot(post_json("/api/v1/share-of-search", &body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn share_of_search_rejects_malformed_brand_color() {
    let app = test_app(PathBuf::from("missing.yaml"));
    let body = serde_json::json!({
        "brands": [{ "name": "Acme", "keywords": ["acme"], "color": "not-a-color" }]
    });
    let response = app
        .oneshot(post_json("/api/v1/share-of-search", &body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("not-a-color")));
}

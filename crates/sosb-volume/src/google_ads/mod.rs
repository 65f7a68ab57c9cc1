//! Google Ads keyword-planner volume source.
//!
//! Each qualifying brand becomes one `generateKeywordIdeas` call seeded with
//! the brand's keywords. Only ideas that echo a seed keyword are counted and
//! every monthly volume inside the requested range becomes one monthly
//! observation; the aggregation engine rolls those up to the requested
//! granularity.

pub mod oauth;
pub mod targeting;
mod types;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::Datelike;
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode, Url};
use sosb_core::{AnalysisRequest, AppConfig, Brand, RawVolumeObservation, SearchSettings};
use tokio::sync::Mutex;

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::source::VolumeSource;

use self::oauth::OAuthClient;
use self::targeting::{geo_target_constant, keyword_plan_network, language_constant};
use self::types::{
    month_name, month_number, ApiErrorEnvelope, GenerateKeywordIdeasRequest,
    GenerateKeywordIdeasResponse, HistoricalMetricsOptions, KeywordSeed, YearMonth, YearMonthRange,
};

const DEFAULT_BASE_URL: &str = "https://googleads.googleapis.com/";
const API_VERSION: &str = "v20";
/// Access tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3_600;
const MAX_PAGES: usize = 50;

/// Credentials and tuning for [`GoogleAdsSource`].
#[derive(Clone)]
pub struct GoogleAdsConfig {
    pub developer_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Customer ID without dashes.
    pub customer_id: String,
    pub login_customer_id: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_concurrent_brands: usize,
}

impl std::fmt::Debug for GoogleAdsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAdsConfig")
            .field("developer_token", &"[redacted]")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("customer_id", &self.customer_id)
            .field("login_customer_id", &self.login_customer_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("max_concurrent_brands", &self.max_concurrent_brands)
            .finish()
    }
}

impl GoogleAdsConfig {
    /// Extracts the Google Ads settings from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredentials`] listing every required
    /// variable that is unset.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SourceError> {
        let creds = &config.google_ads;
        let required = [
            ("GOOGLE_DEVELOPER_TOKEN", &creds.developer_token),
            ("GOOGLE_CLIENT_ID", &creds.client_id),
            ("GOOGLE_CLIENT_SECRET", &creds.client_secret),
            ("GOOGLE_REFRESH_TOKEN", &creds.refresh_token),
            ("GOOGLE_CUSTOMER_ID", &creds.customer_id),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(SourceError::MissingCredentials(missing));
        }

        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(Self {
            developer_token: value(&creds.developer_token),
            client_id: value(&creds.client_id),
            client_secret: value(&creds.client_secret),
            refresh_token: value(&creds.refresh_token),
            customer_id: value(&creds.customer_id),
            login_customer_id: creds.login_customer_id.clone(),
            request_timeout_secs: config.ads_request_timeout_secs,
            max_retries: config.ads_max_retries,
            retry_backoff_base_ms: config.ads_retry_backoff_base_ms,
            max_concurrent_brands: config.ads_max_concurrent_brands.max(1),
        })
    }
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Volume source backed by the Google Ads keyword planner.
pub struct GoogleAdsSource {
    client: Client,
    oauth: OAuthClient,
    base_url: Url,
    config: GoogleAdsConfig,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleAdsSource {
    /// Creates a source pointed at the production Google endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if an HTTP client cannot be constructed.
    pub fn new(config: GoogleAdsConfig) -> Result<Self, SourceError> {
        let oauth = OAuthClient::new(
            &config.client_id,
            &config.client_secret,
            config.request_timeout_secs,
        )?;
        Self::with_oauth(config, oauth, DEFAULT_BASE_URL)
    }

    /// Creates a source with a custom API base URL and OAuth client (for
    /// testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed,
    /// or [`SourceError::Api`] if `base_url` is not a valid URL.
    pub fn with_oauth(
        config: GoogleAdsConfig,
        oauth: OAuthClient,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("sosb/0.1 (share-of-search)")
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SourceError::Api {
            status: 0,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            oauth,
            base_url,
            config,
            token: Mutex::new(None),
        })
    }

    /// Returns a cached access token, refreshing it when close to expiry.
    async fn access_token(&self) -> Result<String, SourceError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.access_token.clone());
            }
        }

        let response = retry_with_backoff(
            self.config.max_retries,
            self.config.retry_backoff_base_ms,
            || self.oauth.refresh_access_token(&self.config.refresh_token),
        )
        .await?;

        let lifetime = token_lifetime(response.expires_in);
        tracing::debug!(lifetime_secs = lifetime, "refreshed Google Ads access token");

        let now = Instant::now();
        let access_token = response.access_token;
        *guard = Some(CachedToken {
            access_token: access_token.clone(),
            refresh_at: now
                .checked_add(Duration::from_secs(lifetime))
                .unwrap_or(now),
        });
        Ok(access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    fn ideas_url(&self) -> Result<Url, SourceError> {
        let path = format!(
            "{API_VERSION}/customers/{}:generateKeywordIdeas",
            self.config.customer_id
        );
        self.base_url.join(&path).map_err(|e| SourceError::Api {
            status: 0,
            message: format!("invalid request path '{path}': {e}"),
        })
    }

    /// Sends one `generateKeywordIdeas` page request.
    async fn request_ideas(
        &self,
        body: &GenerateKeywordIdeasRequest,
    ) -> Result<GenerateKeywordIdeasResponse, SourceError> {
        let token = self.access_token().await?;
        let mut request = self
            .client
            .post(self.ideas_url()?)
            .bearer_auth(token)
            .header("developer-token", &self.config.developer_token)
            .json(body);
        if let Some(login_customer_id) = &self.config.login_customer_id {
            request = request.header("login-customer-id", login_customer_id);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.invalidate_token().await;
            }
            return Err(classify_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| SourceError::Deserialize {
            context: "generateKeywordIdeas response".to_owned(),
            source: e,
        })
    }

    /// Fetches every monthly observation for one brand, following pagination
    /// until each seed keyword has been seen or the pages run out.
    async fn fetch_brand(
        &self,
        brand: &Brand,
        settings: &SearchSettings,
    ) -> Result<Vec<RawVolumeObservation>, SourceError> {
        let keywords: Vec<String> = brand
            .qualifying_keywords()
            .into_iter()
            .map(str::to_owned)
            .collect();
        let mut pending: HashSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let mut body = build_request(keywords, settings);
        let range = month_range(settings);

        let mut observations = Vec::new();
        for page in 0..MAX_PAGES {
            let response = retry_with_backoff(
                self.config.max_retries,
                self.config.retry_backoff_base_ms,
                || self.request_ideas(&body),
            )
            .await?;

            for idea in response.results {
                if !pending.remove(&idea.text.to_lowercase()) {
                    continue;
                }
                let Some(metrics) = idea.keyword_idea_metrics else {
                    continue;
                };
                for monthly in metrics.monthly_search_volumes {
                    let Some(month) = month_number(&monthly.month) else {
                        continue;
                    };
                    let Ok(year) = i32::try_from(monthly.year) else {
                        continue;
                    };
                    if (year, month) < range.0 || (year, month) > range.1 {
                        continue;
                    }
                    observations.push(RawVolumeObservation::new(
                        brand.display_name(),
                        format!("{year:04}-{month:02}"),
                        monthly.monthly_searches.unwrap_or(0),
                    ));
                }
            }

            match response.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if !pending.is_empty() => {
                    tracing::debug!(brand = brand.display_name(), page, "following next page");
                    body.page_token = Some(token);
                }
                _ => break,
            }
        }

        if !pending.is_empty() {
            tracing::warn!(
                brand = brand.display_name(),
                missing = ?pending,
                "keyword planner returned no metrics for some keywords"
            );
        }
        tracing::info!(
            brand = brand.display_name(),
            observations = observations.len(),
            "fetched keyword planner volumes"
        );
        Ok(observations)
    }
}

impl VolumeSource for GoogleAdsSource {
    fn name(&self) -> &'static str {
        "google_ads"
    }

    async fn fetch(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Vec<RawVolumeObservation>, SourceError> {
        let settings = request.settings();
        let brands: Vec<Brand> = request.qualifying_brands().cloned().collect();
        let per_brand: Vec<Vec<RawVolumeObservation>> = stream::iter(brands)
            .map(|brand| async move { self.fetch_brand(&brand, settings).await })
            .buffered(self.config.max_concurrent_brands.max(1))
            .try_collect()
            .await?;

        Ok(per_brand.into_iter().flatten().collect())
    }
}

/// Seconds a fresh access token is reused for. Lifetimes above the standard
/// one hour are capped so an absurd upstream `expires_in` cannot overflow.
fn token_lifetime(expires_in: Option<u64>) -> u64 {
    expires_in
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
        .min(DEFAULT_TOKEN_LIFETIME_SECS)
        .saturating_sub(TOKEN_REFRESH_MARGIN_SECS)
}

/// Inclusive `(year, month)` bounds of the settings' date range.
fn month_range(settings: &SearchSettings) -> ((i32, u32), (i32, u32)) {
    (
        (settings.date_from.year(), settings.date_from.month()),
        (settings.date_to.year(), settings.date_to.month()),
    )
}

fn build_request(keywords: Vec<String>, settings: &SearchSettings) -> GenerateKeywordIdeasRequest {
    let ((from_year, from_month), (to_year, to_month)) = month_range(settings);
    GenerateKeywordIdeasRequest {
        language: language_constant(&settings.language),
        geo_target_constants: geo_target_constant(&settings.location).into_iter().collect(),
        keyword_plan_network: keyword_plan_network(settings.network),
        keyword_seed: KeywordSeed { keywords },
        historical_metrics_options: HistoricalMetricsOptions {
            year_month_range: YearMonthRange {
                start: YearMonth {
                    year: from_year,
                    month: month_name(from_month),
                },
                end: YearMonth {
                    year: to_year,
                    month: month_name(to_month),
                },
            },
        },
        page_token: None,
    }
}

/// Maps a non-2xx API response onto a [`SourceError`].
fn classify_error(status: StatusCode, body: &str) -> SourceError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"));
    let api_status = parsed.as_ref().map_or("", |e| e.error.status.as_str());

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        SourceError::QuotaExceeded(message)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        SourceError::Auth(message)
    } else {
        SourceError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

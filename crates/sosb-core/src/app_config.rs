use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which volume source a binary wires into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Synthetic,
    GoogleAds,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Synthetic => write!(f, "synthetic"),
            SourceKind::GoogleAds => write!(f, "google_ads"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synthetic" => Ok(SourceKind::Synthetic),
            "google_ads" | "google-ads" => Ok(SourceKind::GoogleAds),
            other => Err(format!(
                "unknown source '{other}'; expected synthetic or google_ads"
            )),
        }
    }
}

/// Google Ads API credentials. Every field is optional at load time; the
/// Google Ads source reports the missing ones when it is constructed.
#[derive(Clone, Default)]
pub struct GoogleAdsCredentials {
    pub developer_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub customer_id: Option<String>,
    pub login_customer_id: Option<String>,
}

impl std::fmt::Debug for GoogleAdsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("GoogleAdsCredentials")
            .field("developer_token", &redact(&self.developer_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("customer_id", &self.customer_id)
            .field("login_customer_id", &self.login_customer_id)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub brands_path: PathBuf,
    pub source: SourceKind,
    pub synthetic_seed: u64,
    pub ads_request_timeout_secs: u64,
    pub ads_max_retries: u32,
    pub ads_retry_backoff_base_ms: u64,
    pub ads_max_concurrent_brands: usize,
    pub google_ads: GoogleAdsCredentials,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("brands_path", &self.brands_path)
            .field("source", &self.source)
            .field("synthetic_seed", &self.synthetic_seed)
            .field("ads_request_timeout_secs", &self.ads_request_timeout_secs)
            .field("ads_max_retries", &self.ads_max_retries)
            .field("ads_retry_backoff_base_ms", &self.ads_retry_backoff_base_ms)
            .field("ads_max_concurrent_brands", &self.ads_max_concurrent_brands)
            .field("google_ads", &self.google_ads)
            .finish()
    }
}

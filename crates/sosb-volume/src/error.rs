use sosb_core::ValidationError;
use thiserror::Error;

/// Errors returned by a volume observation source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token exchange failed or the API rejected the credentials (401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API answered with a non-2xx status that is not auth or quota related.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limit or `RESOURCE_EXHAUSTED`. Never retried.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing Google Ads credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

/// Everything a share-of-search run can fail with.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while loading configuration or the brand registry file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[source] serde_yaml::Error),

    #[error("brands validation failed: {0}")]
    Validation(String),
}

/// Rejections raised before any observation is fetched or aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("start date {from} is after end date {to}")]
    InvertedDateRange { from: NaiveDate, to: NaiveDate },

    #[error("date {0} is outside the supported years 0000 to 9999")]
    YearOutOfRange(NaiveDate),

    #[error("date range spans {buckets} buckets; at most {max} are allowed")]
    TooManyBuckets { buckets: u64, max: u64 },

    #[error("at least one brand needs a name and a non-blank keyword")]
    NoQualifyingBrands,

    #[error("duplicate brand name: '{0}'")]
    DuplicateBrandName(String),

    #[error("brand '{brand}' has invalid color '{color}'; expected #rgb or #rrggbb")]
    InvalidColor { brand: String, color: String },
}

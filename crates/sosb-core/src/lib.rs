//! Share-of-search domain model: brands, settings, period bucketing,
//! aggregation, normalization and result projection.

pub mod aggregate;
pub mod analysis;
pub mod app_config;
pub mod brands;
pub mod colors;
pub mod config;
pub mod error;
pub mod period;
pub mod projection;
pub mod settings;
pub mod share;

pub use aggregate::{aggregate, AggregatedPeriod, RawVolumeObservation};
pub use analysis::{AnalysisRequest, ShareReport};
pub use app_config::{AppConfig, Environment, GoogleAdsCredentials, SourceKind};
pub use brands::{load_brands, Brand, BrandsFile};
pub use colors::{assign_colors, FALLBACK_COLOR, PALETTE};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ValidationError};
pub use period::{bucket_label, periods_between, Period};
pub use projection::{
    to_flat_results, to_pivot, write_csv, write_pivot_csv, PivotCell, PivotRow, SearchResult,
};
pub use settings::{Granularity, Network, SearchSettings, MAX_BUCKETS};
pub use share::{normalize, round1};

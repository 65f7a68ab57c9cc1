//! Volume observation sources and the async share-of-search pipeline.

pub mod error;
pub mod google_ads;
pub mod pipeline;
pub(crate) mod retry;
pub mod source;
pub mod synthetic;

pub use error::{AnalysisError, SourceError};
pub use google_ads::oauth::{OAuthClient, TokenResponse, DEFAULT_REDIRECT_URI};
pub use google_ads::{GoogleAdsConfig, GoogleAdsSource};
pub use pipeline::run_analysis;
pub use source::{ConfiguredSource, VolumeSource};
pub use synthetic::SyntheticSource;

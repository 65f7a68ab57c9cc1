//! Wire types for the keyword planner REST endpoint.
//!
//! The JSON mapping of the API encodes 64-bit integers as strings, so numeric
//! fields accept either representation.

use serde::{Deserialize, Deserializer, Serialize};

const MONTHS: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// `MonthOfYear` enum name for a 1-based month.
pub(crate) fn month_name(month: u32) -> &'static str {
    let index = usize::try_from(month.clamp(1, 12) - 1).unwrap_or(0);
    MONTHS[index]
}

/// 1-based month for a `MonthOfYear` enum name.
pub(crate) fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == name)
        .and_then(|i| u32::try_from(i + 1).ok())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateKeywordIdeasRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geo_target_constants: Vec<String>,
    pub keyword_plan_network: &'static str,
    pub keyword_seed: KeywordSeed,
    pub historical_metrics_options: HistoricalMetricsOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct KeywordSeed {
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoricalMetricsOptions {
    pub year_month_range: YearMonthRange,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct YearMonthRange {
    pub start: YearMonth,
    pub end: YearMonth,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct YearMonth {
    pub year: i32,
    pub month: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateKeywordIdeasResponse {
    #[serde(default)]
    pub results: Vec<KeywordIdea>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KeywordIdea {
    pub text: String,
    #[serde(default)]
    pub keyword_idea_metrics: Option<KeywordIdeaMetrics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KeywordIdeaMetrics {
    #[serde(default)]
    pub monthly_search_volumes: Vec<MonthlySearchVolume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MonthlySearchVolume {
    #[serde(deserialize_with = "deserialize_u64")]
    pub year: u64,
    pub month: String,
    /// Omitted by the API when zero.
    #[serde(default, deserialize_with = "deserialize_opt_u64")]
    pub monthly_searches: Option<u64>,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(u64),
    String(String),
}

impl StringOrNumber {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            StringOrNumber::Number(n) => Ok(n),
            StringOrNumber::String(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer)?.into_u64()
}

fn deserialize_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer)?
        .map(StringOrNumber::into_u64)
        .transpose()
}

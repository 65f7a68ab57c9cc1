use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Search network the volumes are measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Google,
    GoogleSearchPartners,
    Both,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Google => write!(f, "google"),
            Network::GoogleSearchPartners => write!(f, "google_search_partners"),
            Network::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Network::Google),
            "google_search_partners" => Ok(Network::GoogleSearchPartners),
            "both" => Ok(Network::Both),
            other => Err(format!(
                "unknown network '{other}'; expected google, google_search_partners or both"
            )),
        }
    }
}

/// Size of the period buckets results are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// Number of months covered by one bucket.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Granularity::Monthly => 1,
            Granularity::Quarterly => 3,
            Granularity::Yearly => 12,
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Monthly => write!(f, "monthly"),
            Granularity::Quarterly => write!(f, "quarterly"),
            Granularity::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Granularity::Monthly),
            "quarterly" => Ok(Granularity::Quarterly),
            "yearly" => Ok(Granularity::Yearly),
            other => Err(format!(
                "unknown granularity '{other}'; expected monthly, quarterly or yearly"
            )),
        }
    }
}

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9_999;

/// Upper bound on the buckets one run may span (a century of months).
pub const MAX_BUCKETS: u64 = 1_200;

/// Parameters of one share-of-search run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub location: String,
    pub language: String,
    pub network: Network,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub granularity: Granularity,
}

impl SearchSettings {
    /// Settings a fresh input form starts from: the twelve full months ending
    /// with the month before `today`, bucketed monthly.
    #[must_use]
    pub fn default_as_of(today: NaiveDate) -> Self {
        let this_month = today.with_day(1).unwrap_or(today);
        let date_to = this_month.pred_opt().unwrap_or(this_month);
        let last_month_start = date_to.with_day(1).unwrap_or(date_to);
        let date_from = last_month_start
            .checked_sub_months(Months::new(11))
            .unwrap_or(last_month_start);

        Self {
            location: "United States".to_string(),
            language: "English".to_string(),
            network: Network::Google,
            date_from,
            date_to,
            granularity: Granularity::Monthly,
        }
    }

    /// Checks that the date range is usable.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvertedDateRange`] when `date_from > date_to`.
    /// - [`ValidationError::YearOutOfRange`] when either date falls outside
    ///   the four-digit years `0000..=9999` bucket labels can express.
    /// - [`ValidationError::TooManyBuckets`] when the range spans more than
    ///   [`MAX_BUCKETS`] buckets of the requested granularity.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.date_from > self.date_to {
            return Err(ValidationError::InvertedDateRange {
                from: self.date_from,
                to: self.date_to,
            });
        }
        for date in [self.date_from, self.date_to] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
                return Err(ValidationError::YearOutOfRange(date));
            }
        }

        let buckets = self.bucket_count();
        if buckets > MAX_BUCKETS {
            return Err(ValidationError::TooManyBuckets {
                buckets,
                max: MAX_BUCKETS,
            });
        }
        Ok(())
    }

    /// Number of buckets `date_from..=date_to` touches. Assumes non-negative
    /// years and an ordered range.
    fn bucket_count(&self) -> u64 {
        let month_index = |date: NaiveDate| {
            u64::try_from(date.year()).unwrap_or(0) * 12 + u64::from(date.month0())
        };
        let size = u64::from(self.granularity.months());
        month_index(self.date_to) / size - month_index(self.date_from) / size + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_covers_previous_twelve_months() {
        let settings = SearchSettings::default_as_of(date(2024, 3, 15));
        assert_eq!(settings.date_from, date(2023, 3, 1));
        assert_eq!(settings.date_to, date(2024, 2, 29));
        assert_eq!(settings.granularity, Granularity::Monthly);
        assert_eq!(settings.network, Network::Google);
        assert_eq!(settings.location, "United States");
    }

    #[test]
    fn default_in_january_rolls_back_a_year() {
        let settings = SearchSettings::default_as_of(date(2025, 1, 1));
        assert_eq!(settings.date_from, date(2024, 1, 1));
        assert_eq!(settings.date_to, date(2024, 12, 31));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut settings = SearchSettings::default_as_of(date(2024, 3, 15));
        settings.date_from = date(2024, 6, 1);
        settings.date_to = date(2024, 1, 1);
        assert_eq!(
            settings.validate(),
            Err(ValidationError::InvertedDateRange {
                from: date(2024, 6, 1),
                to: date(2024, 1, 1),
            })
        );
    }

    #[test]
    fn validate_accepts_single_day_range() {
        let mut settings = SearchSettings::default_as_of(date(2024, 3, 15));
        settings.date_from = date(2024, 1, 1);
        settings.date_to = date(2024, 1, 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_rejects_five_digit_years() {
        let mut settings = SearchSettings::default_as_of(date(2024, 3, 15));
        settings.date_from = date(10_000, 1, 1);
        settings.date_to = date(10_001, 12, 31);
        settings.granularity = Granularity::Yearly;
        assert_eq!(
            settings.validate(),
            Err(ValidationError::YearOutOfRange(date(10_000, 1, 1)))
        );
    }

    #[test]
    fn validate_rejects_negative_years() {
        let mut settings = SearchSettings::default_as_of(date(2024, 3, 15));
        settings.date_from = date(-1, 6, 1);
        assert_eq!(
            settings.validate(),
            Err(ValidationError::YearOutOfRange(date(-1, 6, 1)))
        );
    }

    #[test]
    fn validate_caps_bucket_count() {
        let mut settings = SearchSettings::default_as_of(date(2024, 3, 15));
        settings.date_from = date(1900, 1, 1);
        settings.date_to = date(2000, 1, 31);
        assert_eq!(
            settings.validate(),
            Err(ValidationError::TooManyBuckets {
                buckets: 1_201,
                max: MAX_BUCKETS,
            })
        );

        settings.granularity = Granularity::Yearly;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn bucket_count_matches_enumerated_periods() {
        let mut settings = SearchSettings::default_as_of(date(2024, 3, 15));
        settings.date_from = date(2022, 11, 15);
        settings.date_to = date(2024, 2, 3);
        for granularity in [Granularity::Monthly, Granularity::Quarterly, Granularity::Yearly] {
            settings.granularity = granularity;
            let enumerated =
                crate::period::periods_between(settings.date_from, settings.date_to, granularity);
            assert_eq!(settings.bucket_count(), enumerated.len() as u64);
        }
    }

    #[test]
    fn enums_round_trip_through_strings() {
        assert_eq!("both".parse::<Network>().unwrap(), Network::Both);
        assert_eq!(Network::GoogleSearchPartners.to_string(), "google_search_partners");
        assert_eq!("quarterly".parse::<Granularity>().unwrap(), Granularity::Quarterly);
        assert!("weekly".parse::<Granularity>().is_err());
    }

    #[test]
    fn settings_deserialize_from_json() {
        let settings: SearchSettings = serde_json::from_value(serde_json::json!({
            "location": "Germany",
            "language": "German",
            "network": "google_search_partners",
            "date_from": "2022-01-01",
            "date_to": "2023-12-31",
            "granularity": "yearly"
        }))
        .unwrap();
        assert_eq!(settings.network, Network::GoogleSearchPartners);
        assert_eq!(settings.granularity, Granularity::Yearly);
    }
}

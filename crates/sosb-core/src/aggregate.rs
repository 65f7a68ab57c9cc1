//! Period bucketing and per-brand volume aggregation.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::brands::Brand;
use crate::period::{periods_between, Period};
use crate::settings::SearchSettings;

/// One raw volume measurement as delivered by a volume source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVolumeObservation {
    pub brand_name: String,
    /// Bucket label (`YYYY`, `YYYY-Qn` or `YYYY-MM`).
    pub period: String,
    pub volume: u64,
}

impl RawVolumeObservation {
    #[must_use]
    pub fn new(brand_name: impl Into<String>, period: impl Into<String>, volume: u64) -> Self {
        Self {
            brand_name: brand_name.into(),
            period: period.into(),
            volume,
        }
    }
}

/// Summed volumes of every qualifying brand within one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedPeriod {
    pub period: String,
    pub volume_by_brand: BTreeMap<String, u64>,
    pub total: u64,
}

impl AggregatedPeriod {
    fn from_volumes(period: &Period, volume_by_brand: BTreeMap<String, u64>) -> Self {
        let total = volume_by_brand
            .values()
            .fold(0u64, |acc, v| acc.saturating_add(*v));
        Self {
            period: period.label(),
            volume_by_brand,
            total,
        }
    }
}

/// Groups `observations` into the buckets spanned by the settings' date
/// range and sums volumes per brand.
///
/// Every bucket in range is returned, in ascending start order, even when no
/// brand has volume in it. Observations are dropped when they belong to a
/// brand that does not qualify (blank name or only blank keywords), when
/// their label cannot be parsed, when it is coarser than the requested
/// granularity, or when it falls outside the range. Finer labels are rolled
/// up into the containing bucket.
#[must_use]
pub fn aggregate(
    observations: &[RawVolumeObservation],
    brands: &[Brand],
    settings: &SearchSettings,
) -> Vec<AggregatedPeriod> {
    let qualifying: HashSet<&str> = brands
        .iter()
        .filter(|b| b.is_qualifying())
        .map(Brand::display_name)
        .collect();

    let mut buckets: BTreeMap<Period, BTreeMap<String, u64>> =
        periods_between(settings.date_from, settings.date_to, settings.granularity)
            .into_iter()
            .map(|p| (p, BTreeMap::new()))
            .collect();

    let mut dropped = 0usize;
    for observation in observations {
        let brand_name = observation.brand_name.trim();
        if !qualifying.contains(brand_name) {
            tracing::debug!(
                brand = %observation.brand_name,
                period = %observation.period,
                "dropping observation for non-qualifying brand"
            );
            dropped += 1;
            continue;
        }

        let bucket = Period::parse(&observation.period)
            .and_then(|p| p.roll_up(settings.granularity))
            .and_then(|p| buckets.get_mut(&p));

        match bucket {
            Some(volumes) => {
                let entry = volumes.entry(brand_name.to_owned()).or_insert(0);
                *entry = entry.saturating_add(observation.volume);
            }
            None => {
                tracing::warn!(
                    brand = brand_name,
                    period = %observation.period,
                    granularity = %settings.granularity,
                    "dropping observation outside the requested buckets"
                );
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(
            dropped,
            kept = observations.len() - dropped,
            "aggregation filtered observations"
        );
    }

    buckets
        .into_iter()
        .map(|(period, volumes)| AggregatedPeriod::from_volumes(&period, volumes))
        .collect()
}

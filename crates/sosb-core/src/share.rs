//! Per-period share normalization.
//!
//! Shares are computed in [`Decimal`] so the one-decimal rounding is exact
//! (half away from zero) instead of inheriting binary float artifacts.
//! Rounded shares of a period may add up to anything in 99.9..=100.1; the
//! drift is left as is.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::aggregate::AggregatedPeriod;

/// Rounds to one decimal place, midpoints away from zero.
#[must_use]
pub fn round1(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Unrounded percentage of `volume` in `total`. Zero when `total` is zero.
#[must_use]
pub fn share_percent(volume: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(volume) * Decimal::ONE_HUNDRED / Decimal::from(total)
}

/// Rounded share as a plain number for serialization.
#[must_use]
pub fn rounded_share(volume: u64, total: u64) -> f64 {
    round1(share_percent(volume, total))
        .to_f64()
        .unwrap_or(0.0)
}

/// Unrounded share of every brand present in the period.
#[must_use]
pub fn unrounded_shares(period: &AggregatedPeriod) -> BTreeMap<String, Decimal> {
    period
        .volume_by_brand
        .iter()
        .map(|(brand, volume)| (brand.clone(), share_percent(*volume, period.total)))
        .collect()
}

/// Rounded share of every brand present in the period.
#[must_use]
pub fn normalize(period: &AggregatedPeriod) -> BTreeMap<String, f64> {
    period
        .volume_by_brand
        .iter()
        .map(|(brand, volume)| (brand.clone(), rounded_share(*volume, period.total)))
        .collect()
}

//! Validated run snapshot and report assembly.
//!
//! [`AnalysisRequest::new`] is the single validation boundary: once a request
//! exists, aggregation, normalization and projection cannot fail.

use std::collections::HashSet;

use serde::Serialize;

use crate::aggregate::{aggregate, AggregatedPeriod, RawVolumeObservation};
use crate::brands::{is_valid_color, Brand};
use crate::colors::assign_colors;
use crate::period::{periods_between, Period};
use crate::projection::{to_flat_results, to_pivot, PivotRow, SearchResult};
use crate::settings::SearchSettings;
use crate::ValidationError;

/// Immutable inputs of one run: colored brands plus validated settings.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    brands: Vec<Brand>,
    settings: SearchSettings,
}

impl AnalysisRequest {
    /// Validates the caller's snapshot and assigns missing colors.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvertedDateRange`] if `date_from > date_to`.
    /// - [`ValidationError::NoQualifyingBrands`] if no brand has a name and a
    ///   non-blank keyword.
    /// - [`ValidationError::DuplicateBrandName`] if two qualifying brands share
    ///   a name (case-insensitive).
    /// - [`ValidationError::InvalidColor`] if a brand carries a color that is
    ///   not a `#rgb` or `#rrggbb` hex token.
    /// - Any range error from [`SearchSettings::validate`].
    pub fn new(brands: &[Brand], settings: SearchSettings) -> Result<Self, ValidationError> {
        settings.validate()?;

        for brand in brands {
            if let Some(color) = brand.color().filter(|c| !is_valid_color(c)) {
                return Err(ValidationError::InvalidColor {
                    brand: brand.display_name().to_owned(),
                    color: color.to_owned(),
                });
            }
        }

        let mut seen = HashSet::new();
        let mut qualifying = 0usize;
        for brand in brands.iter().filter(|b| b.is_qualifying()) {
            qualifying += 1;
            if !seen.insert(brand.display_name().to_lowercase()) {
                return Err(ValidationError::DuplicateBrandName(
                    brand.display_name().to_owned(),
                ));
            }
        }
        if qualifying == 0 {
            return Err(ValidationError::NoQualifyingBrands);
        }

        Ok(Self {
            brands: assign_colors(brands),
            settings,
        })
    }

    /// All brands of the snapshot, colored, in input order.
    #[must_use]
    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    /// Brands that take part in the run, in input order.
    pub fn qualifying_brands(&self) -> impl Iterator<Item = &Brand> {
        self.brands.iter().filter(|b| b.is_qualifying())
    }

    #[must_use]
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Buckets spanned by the requested date range.
    #[must_use]
    pub fn periods(&self) -> Vec<Period> {
        periods_between(
            self.settings.date_from,
            self.settings.date_to,
            self.settings.granularity,
        )
    }

    /// Aggregates `observations` and projects them into a fresh report.
    #[must_use]
    pub fn build_report(&self, observations: &[RawVolumeObservation]) -> ShareReport {
        let periods = aggregate(observations, &self.brands, &self.settings);
        let results = to_flat_results(&periods, &self.brands);
        let pivot = to_pivot(&periods, &self.brands);

        tracing::info!(
            periods = periods.len(),
            results = results.len(),
            granularity = %self.settings.granularity,
            "share-of-search report built"
        );

        ShareReport {
            settings: self.settings.clone(),
            brands: self.qualifying_brands().cloned().collect(),
            periods,
            results,
            pivot,
        }
    }
}

/// Output snapshot of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ShareReport {
    pub settings: SearchSettings,
    pub brands: Vec<Brand>,
    pub periods: Vec<AggregatedPeriod>,
    pub results: Vec<SearchResult>,
    pub pivot: Vec<PivotRow>,
}

//! Period buckets and their labels.
//!
//! Labels are `YYYY` (yearly), `YYYY-Qn` (quarterly) and `YYYY-MM` (monthly).
//! Within one granularity they sort lexically, but ordering across the crate
//! goes through [`Period`], which compares bucket start dates.

use chrono::{Datelike, Months, NaiveDate};

use crate::settings::Granularity;

/// One bucket of a given granularity, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    start: NaiveDate,
    granularity: Granularity,
}

impl Period {
    /// The bucket of `granularity` that contains `date`.
    #[must_use]
    pub fn containing(date: NaiveDate, granularity: Granularity) -> Self {
        let first_month = match granularity {
            Granularity::Monthly => date.month(),
            Granularity::Quarterly => (date.month0() / 3) * 3 + 1,
            Granularity::Yearly => 1,
        };
        let start = NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap_or(date);
        Self { start, granularity }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The following bucket of the same granularity.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.start
            .checked_add_months(Months::new(self.granularity.months()))
            .map(|start| Self {
                start,
                granularity: self.granularity,
            })
    }

    #[must_use]
    pub fn label(&self) -> String {
        bucket_label(self.start, self.granularity)
    }

    /// Parses any of the three label shapes back into a bucket.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        let (year, rest) = match label.split_once('-') {
            Some((year, rest)) => (year, Some(rest)),
            None => (label, None),
        };
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let year: i32 = year.parse().ok()?;

        let (month, granularity) = match rest {
            None => (1, Granularity::Yearly),
            Some(quarter) if quarter.starts_with('Q') => {
                let q: u32 = match &quarter[1..] {
                    digit @ ("1" | "2" | "3" | "4") => digit.parse().ok()?,
                    _ => return None,
                };
                ((q - 1) * 3 + 1, Granularity::Quarterly)
            }
            Some(month) => {
                if month.len() != 2 || !month.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                (month.parse().ok()?, Granularity::Monthly)
            }
        };

        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { start, granularity })
    }

    /// Re-buckets into a coarser (or equal) granularity.
    ///
    /// Returns `None` when `target` is finer than this bucket, since one
    /// bucket's volume cannot be split across several.
    #[must_use]
    pub fn roll_up(&self, target: Granularity) -> Option<Self> {
        (self.granularity <= target).then(|| Self::containing(self.start, target))
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Label of the bucket of `granularity` containing `date`.
#[must_use]
pub fn bucket_label(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Yearly => format!("{:04}", date.year()),
        Granularity::Quarterly => format!("{:04}-Q{}", date.year(), date.month0() / 3 + 1),
        Granularity::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
    }
}

/// Every bucket touched by `from..=to`, in ascending order.
///
/// Partial buckets at either end are included. Empty when `from > to`.
#[must_use]
pub fn periods_between(from: NaiveDate, to: NaiveDate, granularity: Granularity) -> Vec<Period> {
    let mut periods = Vec::new();
    if from > to {
        return periods;
    }

    let mut current = Some(Period::containing(from, granularity));
    while let Some(period) = current {
        if period.start > to {
            break;
        }
        periods.push(period);
        current = period.next();
    }
    periods
}

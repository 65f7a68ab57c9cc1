//! Flat and pivoted views over aggregated periods.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::aggregate::AggregatedPeriod;
use crate::brands::Brand;
use crate::colors::FALLBACK_COLOR;
use crate::share::rounded_share;

/// One brand's volume and share within one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub brand: String,
    pub period: String,
    pub volume: u64,
    /// Percentage in `0.0..=100.0`, one decimal.
    pub share: f64,
    pub color: String,
}

/// A brand column of a [`PivotRow`]. `None` means the brand had no
/// observation in that period, which is not the same as zero volume.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotCell {
    pub brand: String,
    pub volume: Option<u64>,
    pub share: Option<f64>,
}

/// A period-keyed wide row for charting.
///
/// Serializes flat: `period`, `total_volume`, then `volume_<brand>` and
/// `share_<brand>` for every brand column.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub period: String,
    pub total_volume: u64,
    pub cells: Vec<PivotCell>,
}

impl Serialize for PivotRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.cells.len() * 2))?;
        map.serialize_entry("period", &self.period)?;
        map.serialize_entry("total_volume", &self.total_volume)?;
        for cell in &self.cells {
            map.serialize_entry(&format!("volume_{}", cell.brand), &cell.volume)?;
            map.serialize_entry(&format!("share_{}", cell.brand), &cell.share)?;
        }
        map.end()
    }
}

fn columns(brands: &[Brand]) -> impl Iterator<Item = &Brand> {
    brands.iter().filter(|b| b.is_qualifying())
}

/// One result per brand present in each period, ordered by period and then
/// by the brands' input order.
#[must_use]
pub fn to_flat_results(periods: &[AggregatedPeriod], brands: &[Brand]) -> Vec<SearchResult> {
    periods
        .iter()
        .flat_map(move |period| {
            columns(brands).filter_map(move |brand| {
                let name = brand.display_name();
                period.volume_by_brand.get(name).map(|volume| SearchResult {
                    brand: name.to_owned(),
                    period: period.period.clone(),
                    volume: *volume,
                    share: rounded_share(*volume, period.total),
                    color: brand.color().unwrap_or(FALLBACK_COLOR).to_owned(),
                })
            })
        })
        .collect()
}

/// One row per period with a column pair for every qualifying brand.
#[must_use]
pub fn to_pivot(periods: &[AggregatedPeriod], brands: &[Brand]) -> Vec<PivotRow> {
    periods
        .iter()
        .map(|period| PivotRow {
            period: period.period.clone(),
            total_volume: period.total,
            cells: columns(brands)
                .map(|brand| {
                    let volume = period.volume_by_brand.get(brand.display_name()).copied();
                    PivotCell {
                        brand: brand.display_name().to_owned(),
                        volume,
                        share: volume.map(|v| rounded_share(v, period.total)),
                    }
                })
                .collect(),
        })
        .collect()
}

/// Writes flat results as CSV with a `brand,period,volume,share,color` header.
///
/// # Errors
///
/// Returns [`csv::Error`] if serialization or the underlying writer fails.
pub fn write_csv<W: std::io::Write>(results: &[SearchResult], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for result in results {
        csv_writer.serialize(result)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes pivot rows as CSV using the same column names as the JSON form.
/// Absent brands become empty fields.
///
/// # Errors
///
/// Returns [`csv::Error`] if the underlying writer fails.
pub fn write_pivot_csv<W: std::io::Write>(rows: &[PivotRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["period".to_owned(), "total_volume".to_owned()];
    if let Some(first) = rows.first() {
        for cell in &first.cells {
            header.push(format!("volume_{}", cell.brand));
            header.push(format!("share_{}", cell.brand));
        }
    }
    csv_writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.period.clone(), row.total_volume.to_string()];
        for cell in &row.cells {
            record.push(cell.volume.map(|v| v.to_string()).unwrap_or_default());
            record.push(cell.share.map(|s| format!("{s:.1}")).unwrap_or_default());
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

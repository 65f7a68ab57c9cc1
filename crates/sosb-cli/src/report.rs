//! `report` command: run the pipeline and render the result.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{Months, NaiveDate, Utc};
use clap::{Args, ValueEnum};
use sosb_core::{
    write_csv, write_pivot_csv, AppConfig, Granularity, Network, PivotRow, SearchResult,
    SearchSettings, ShareReport, SourceKind,
};
use sosb_volume::{run_analysis, ConfiguredSource, VolumeSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// One row per brand and period
    Flat,
    /// One row per period, one column pair per brand
    Pivot,
}

/// A `--from`/`--to` value: a full date, or a month that expands to its
/// first or last day depending on which end of the range it bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateArg {
    date: NaiveDate,
    month_only: bool,
}

impl DateArg {
    pub(crate) fn as_start(self) -> NaiveDate {
        self.date
    }

    pub(crate) fn as_end(self) -> NaiveDate {
        if !self.month_only {
            return self.date;
        }
        self.date
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.date)
    }
}

/// Parses `YYYY-MM-DD` or `YYYY-MM`.
pub(crate) fn parse_date_arg(value: &str) -> Result<DateArg, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(DateArg {
            date,
            month_only: false,
        });
    }
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map(|date| DateArg {
            date,
            month_only: true,
        })
        .map_err(|_| format!("invalid date '{value}'; expected YYYY-MM-DD or YYYY-MM"))
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Brand registry file (defaults to SOSB_BRANDS_PATH)
    #[arg(long)]
    pub brands: Option<PathBuf>,
    /// First day of the range (YYYY-MM-DD or YYYY-MM)
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<DateArg>,
    /// Last day of the range (YYYY-MM-DD or YYYY-MM)
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<DateArg>,
    /// monthly, quarterly or yearly
    #[arg(long)]
    pub granularity: Option<Granularity>,
    /// Country name, "All Countries", or a numeric geo target ID
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    /// google, google_search_partners or both
    #[arg(long)]
    pub network: Option<Network>,
    /// Override SOSB_SOURCE (synthetic or google_ads)
    #[arg(long)]
    pub source: Option<SourceKind>,
    /// Override SOSB_SYNTHETIC_SEED
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    #[arg(long, value_enum, default_value_t = View::Flat)]
    pub view: View,
}

/// Overlays the command-line settings on the defaults for `today`.
pub(crate) fn build_settings(args: &ReportArgs, today: NaiveDate) -> SearchSettings {
    let mut settings = SearchSettings::default_as_of(today);
    if let Some(from) = args.from {
        settings.date_from = from.as_start();
    }
    if let Some(to) = args.to {
        settings.date_to = to.as_end();
    }
    if let Some(granularity) = args.granularity {
        settings.granularity = granularity;
    }
    if let Some(location) = &args.location {
        settings.location.clone_from(location);
    }
    if let Some(language) = &args.language {
        settings.language.clone_from(language);
    }
    if let Some(network) = args.network {
        settings.network = network;
    }
    settings
}

/// Run the share-of-search pipeline and print the report to stdout.
///
/// # Errors
///
/// Returns an error if the brand file cannot be loaded, the source cannot be
/// configured, the run fails validation or fetching, or rendering fails.
pub(crate) async fn run_report(mut config: AppConfig, args: &ReportArgs) -> anyhow::Result<()> {
    if let Some(source) = args.source {
        config.source = source;
    }
    if let Some(seed) = args.seed {
        config.synthetic_seed = seed;
    }

    let path = args.brands.as_ref().unwrap_or(&config.brands_path);
    let brands_file = sosb_core::load_brands(path)?;
    let settings = build_settings(args, Utc::now().date_naive());

    let source = ConfiguredSource::from_app_config(&config)?;
    tracing::debug!(source = source.name(), path = %path.display(), "report configured");
    let report = run_analysis(&source, &brands_file.brands, settings).await?;

    print!("{}", render(&report, args.format, args.view)?);
    Ok(())
}

/// Renders `report` in the requested format and view.
///
/// # Errors
///
/// Returns an error if JSON or CSV serialization fails.
pub(crate) fn render(report: &ShareReport, format: OutputFormat, view: View) -> anyhow::Result<String> {
    let rendered = match (format, view) {
        (OutputFormat::Json, View::Flat) => {
            format!("{}\n", serde_json::to_string_pretty(&report.results)?)
        }
        (OutputFormat::Json, View::Pivot) => {
            format!("{}\n", serde_json::to_string_pretty(&report.pivot)?)
        }
        (OutputFormat::Csv, View::Flat) => {
            let mut buf = Vec::new();
            write_csv(&report.results, &mut buf)?;
            String::from_utf8(buf)?
        }
        (OutputFormat::Csv, View::Pivot) => {
            let mut buf = Vec::new();
            write_pivot_csv(&report.pivot, &mut buf)?;
            String::from_utf8(buf)?
        }
        (OutputFormat::Table, View::Flat) => {
            format!("{}\n{}", summary_line(&report.settings), flat_table(&report.results))
        }
        (OutputFormat::Table, View::Pivot) => {
            format!("{}\n{}", summary_line(&report.settings), pivot_table(&report.pivot))
        }
    };
    Ok(rendered)
}

fn summary_line(settings: &SearchSettings) -> String {
    format!(
        "share of search {} to {} ({}), {}, {}, {}\n",
        settings.date_from,
        settings.date_to,
        settings.granularity,
        settings.location,
        settings.language,
        settings.network
    )
}

pub(crate) fn flat_table(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "no search volume in the selected range\n".to_string();
    }

    let mut out = format!(
        "{:<10}{:<24}{:>12}{:>9}  COLOR\n",
        "PERIOD", "BRAND", "VOLUME", "SHARE"
    );
    for result in results {
        let _ = writeln!(
            out,
            "{:<10}{:<24}{:>12}{:>8.1}%  {}",
            result.period, result.brand, result.volume, result.share, result.color
        );
    }
    out
}

pub(crate) fn pivot_table(rows: &[PivotRow]) -> String {
    let Some(first) = rows.first() else {
        return "no periods in the selected range\n".to_string();
    };

    let widths: Vec<usize> = first
        .cells
        .iter()
        .map(|cell| cell.brand.chars().count().max(16) + 2)
        .collect();

    let mut out = format!("{:<10}{:>12}", "PERIOD", "TOTAL");
    for (cell, width) in first.cells.iter().zip(&widths) {
        let _ = write!(out, "{:>width$}", cell.brand, width = *width);
    }
    out.push('\n');

    for row in rows {
        let _ = write!(out, "{:<10}{:>12}", row.period, row.total_volume);
        for (cell, width) in row.cells.iter().zip(&widths) {
            let text = match (cell.volume, cell.share) {
                (Some(volume), Some(share)) => format!("{share:.1}% ({volume})"),
                _ => "-".to_string(),
            };
            let _ = write!(out, "{text:>width$}", width = *width);
        }
        out.push('\n');
    }
    out
}

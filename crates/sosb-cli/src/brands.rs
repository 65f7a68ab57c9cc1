//! `brands` command: inspect the brand registry file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use sosb_core::{assign_colors, load_brands, AppConfig, Brand, FALLBACK_COLOR};

#[derive(Debug, Subcommand)]
pub enum BrandsCommands {
    /// Validate the registry and list brands with their assigned colors
    Check {
        /// Brand registry file (defaults to SOSB_BRANDS_PATH)
        #[arg(long)]
        brands: Option<PathBuf>,
    },
}

/// Load and validate the brand registry, then print it as a table.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if
/// no brand would take part in a run.
pub(crate) fn run_brands_check(config: &AppConfig, path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.unwrap_or(config.brands_path.as_path());
    let file = load_brands(path)?;
    let brands = assign_colors(&file.brands);

    print!("{}", brand_table(&brands));

    let qualifying = brands.iter().filter(|b| b.is_qualifying()).count();
    if qualifying == 0 {
        anyhow::bail!(
            "no brand in {} has both a name and a non-blank keyword",
            path.display()
        );
    }
    println!(
        "{qualifying} of {} brands will be included in reports",
        brands.len()
    );
    Ok(())
}

pub(crate) fn brand_table(brands: &[Brand]) -> String {
    let mut out = format!(
        "{:<20}{:<6}{:<10}{:<10}KEYWORDS\n",
        "NAME", "OWN", "COLOR", "STATUS"
    );
    for brand in brands {
        let name = if brand.display_name().is_empty() {
            "(unnamed)"
        } else {
            brand.display_name()
        };
        let status = if brand.is_qualifying() { "ok" } else { "skipped" };
        let _ = writeln!(
            out,
            "{:<20}{:<6}{:<10}{:<10}{}",
            name,
            if brand.is_own_brand { "yes" } else { "no" },
            brand.color().unwrap_or(FALLBACK_COLOR),
            status,
            brand.qualifying_keywords().join(", ")
        );
    }
    out
}

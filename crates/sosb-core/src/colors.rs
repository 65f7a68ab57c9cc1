//! Display color assignment for the brand registry.
//!
//! A brand's color is picked the first time it is seen without one, from
//! [`PALETTE`] at the brand's position in that input sequence, and never
//! changes afterwards. Brands that already carry a color keep it no matter
//! where they move in the list.

use crate::brands::Brand;

/// Fallback used when rendering a brand that was never colored.
pub const FALLBACK_COLOR: &str = "#cccccc";

/// Ten-color categorical palette, cycled with modulo wraparound.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Palette entry for the brand at `position` in the current input sequence.
#[must_use]
pub fn palette_color(position: usize) -> &'static str {
    PALETTE[position % PALETTE.len()]
}

/// Returns a copy of `brands` where every uncolored brand received
/// `palette_color(index)`. Already colored brands are returned untouched.
///
/// Idempotent: a second call on the result changes nothing.
#[must_use]
pub fn assign_colors(brands: &[Brand]) -> Vec<Brand> {
    brands
        .iter()
        .enumerate()
        .map(|(index, brand)| {
            let mut brand = brand.clone();
            if brand.assign_color(palette_color(index)) {
                tracing::trace!(brand = %brand.name, index, "assigned palette color");
            }
            brand
        })
        .collect()
}

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::ConfigError;

/// A tracked entity: one of the user's own brands or a competitor.
///
/// `keywords` is never empty. Operations that would empty it leave a single
/// blank placeholder instead, so an input surface always has a row to edit.
/// `color` can be set once and is never replaced afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(
        default = "placeholder_keywords",
        deserialize_with = "deserialize_keywords"
    )]
    keywords: Vec<String>,
    #[serde(default)]
    pub is_own_brand: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

fn placeholder_keywords() -> Vec<String> {
    vec![String::new()]
}

fn deserialize_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let keywords = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    if keywords.is_empty() {
        Ok(placeholder_keywords())
    } else {
        Ok(keywords)
    }
}

impl Brand {
    /// Creates an unnamed-keyword brand with a fresh id and no color.
    #[must_use]
    pub fn new(name: impl Into<String>, is_own_brand: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            keywords: placeholder_keywords(),
            is_own_brand,
            color: None,
        }
    }

    /// Replaces the keyword list. An empty iterator leaves the placeholder.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        if self.keywords.is_empty() {
            self.keywords = placeholder_keywords();
        }
        self
    }

    /// Sets the display color if none has been assigned yet.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.assign_color(color);
        self
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Stores `color` only when the brand has none. Returns whether it was stored.
    pub(crate) fn assign_color(&mut self, color: impl Into<String>) -> bool {
        if self.color.is_some() {
            return false;
        }
        self.color = Some(color.into());
        true
    }

    pub fn add_keyword(&mut self, keyword: impl Into<String>) {
        self.keywords.push(keyword.into());
    }

    /// Overwrites the keyword at `index`. Returns `false` if out of range.
    pub fn set_keyword(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.keywords.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Removes the keyword at `index`, leaving a blank placeholder if the
    /// list would become empty. Returns `false` if out of range.
    pub fn remove_keyword(&mut self, index: usize) -> bool {
        if index >= self.keywords.len() {
            return false;
        }
        self.keywords.remove(index);
        if self.keywords.is_empty() {
            self.keywords = placeholder_keywords();
        }
        true
    }

    /// Replaces keywords from free text, one keyword per line.
    ///
    /// Lines are trimmed and blank lines dropped.
    pub fn set_keywords_from_text(&mut self, text: &str) {
        self.keywords = text
            .lines()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        if self.keywords.is_empty() {
            self.keywords = placeholder_keywords();
        }
    }

    /// Trimmed, non-blank keywords in input order.
    #[must_use]
    pub fn qualifying_keywords(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// The trimmed name used to key volumes and results.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.trim()
    }

    /// A brand takes part in a run only with a name and at least one keyword.
    #[must_use]
    pub fn is_qualifying(&self) -> bool {
        !self.display_name().is_empty() && self.keywords.iter().any(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<Brand>,
}

/// Load and validate the brand registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let brands_file: BrandsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::BrandsFileParse)?;

    validate_brands(&brands_file)?;

    tracing::debug!(
        path = %path.display(),
        count = brands_file.brands.len(),
        "loaded brand registry"
    );

    Ok(brands_file)
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_ids = HashSet::new();

    for brand in &brands_file.brands {
        if !seen_ids.insert(brand.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand id: {}",
                brand.id
            )));
        }

        if let Some(color) = brand.color() {
            if !is_valid_color(color) {
                return Err(ConfigError::Validation(format!(
                    "brand '{}' has invalid color '{color}'; expected #rgb or #rrggbb",
                    brand.name
                )));
            }
        }

        // Unnamed rows are kept; they never qualify for a run.
        let name = brand.display_name();
        if name.is_empty() {
            continue;
        }

        if !seen_names.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{name}'"
            )));
        }
    }

    Ok(())
}

/// Accepts CSS hex colors in `#rgb` or `#rrggbb` form.
#[must_use]
pub fn is_valid_color(color: &str) -> bool {
    color.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

#[cfg(test)]
#[path = "brands_test.rs"]
mod tests;

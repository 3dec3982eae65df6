//! Platform registry: statistics sources, their extraction maps, and fallbacks.
//!
//! A registry entry splits into the [`PlatformDescriptor`] the aggregation
//! engine consumes and the [`PlatformDisplay`] metadata only the presentation
//! side reads.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::stats::{StatField, StatValue};
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Competitive,
    Practice,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Competitive => write!(f, "competitive"),
            Category::Practice => write!(f, "practice"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "competitive" => Ok(Category::Competitive),
            "practice" => Ok(Category::Practice),
            other => Err(format!(
                "unknown category '{other}'; expected 'competitive' or 'practice'"
            )),
        }
    }
}

/// Source-specific path expression per canonical field.
///
/// A missing, null, or blank path means the source cannot supply that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldMap {
    pub questions_solved: Option<String>,
    pub rank: Option<String>,
    pub contests: Option<String>,
}

impl FieldMap {
    #[must_use]
    pub fn path(&self, field: StatField) -> Option<&str> {
        let raw = match field {
            StatField::QuestionsSolved => self.questions_solved.as_deref(),
            StatField::Rank => self.rank.as_deref(),
            StatField::Contests => self.contests.as_deref(),
        };
        raw.map(str::trim).filter(|p| !p.is_empty())
    }

    /// Fields that have a usable path, in canonical order.
    pub fn paths(&self) -> impl Iterator<Item = (StatField, &str)> + '_ {
        StatField::ALL
            .into_iter()
            .filter_map(move |field| self.path(field).map(|p| (field, p)))
    }
}

/// Manually curated values used when live data is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FallbackRecord {
    pub questions_solved: Option<StatValue>,
    pub rank: Option<StatValue>,
    pub contests: Option<StatValue>,
}

impl FallbackRecord {
    /// The fallback for `field`, or the placeholder when none is curated.
    #[must_use]
    pub fn get(&self, field: StatField) -> StatValue {
        let value = match field {
            StatField::QuestionsSolved => self.questions_solved.as_ref(),
            StatField::Rank => self.rank.as_ref(),
            StatField::Contests => self.contests.as_ref(),
        };
        value.cloned().unwrap_or_default()
    }
}

/// Extraction configuration for one statistics source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    pub name: String,
    /// Remote statistics endpoint. `None` marks a manual-only platform.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub field_map: FieldMap,
    #[serde(default)]
    pub fallback: FallbackRecord,
}

impl PlatformDescriptor {
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformDisplay {
    pub icon: Option<String>,
    pub profile_url: Option<String>,
    pub category: Option<Category>,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// One registry entry: extraction descriptor plus display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(flatten)]
    pub descriptor: PlatformDescriptor,
    #[serde(default)]
    pub display: PlatformDisplay,
}

impl PlatformConfig {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Generate a URL-safe slug from the platform name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.descriptor
            .name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    #[must_use]
    pub fn in_category(&self, category: Option<Category>) -> bool {
        category.is_none_or(|c| self.display.category == Some(c))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformsFile {
    pub platforms: Vec<PlatformConfig>,
}

impl PlatformsFile {
    pub fn descriptors(&self) -> impl Iterator<Item = &PlatformDescriptor> {
        self.platforms.iter().map(|p| &p.descriptor)
    }

    /// Platforms in `category`, in registry order; `None` returns all.
    #[must_use]
    pub fn by_category(&self, category: Option<Category>) -> Vec<&PlatformConfig> {
        self.platforms
            .iter()
            .filter(|p| p.in_category(category))
            .collect()
    }

    /// Look up a platform by slug or case-insensitive name.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&PlatformConfig> {
        let lower = key.trim().to_lowercase();
        self.platforms
            .iter()
            .find(|p| p.slug() == lower || p.name().to_lowercase() == lower)
    }
}

/// Load and validate the platform registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_platforms(path: &Path) -> Result<PlatformsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PlatformsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_platforms(&content)
}

/// Parse and validate a platform registry from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML cannot be parsed or fails validation.
pub fn parse_platforms(content: &str) -> Result<PlatformsFile, ConfigError> {
    let platforms_file: PlatformsFile = serde_yaml::from_str(content)?;
    validate_platforms(&platforms_file)?;
    Ok(platforms_file)
}

fn validate_platforms(platforms_file: &PlatformsFile) -> Result<(), ConfigError> {
    if platforms_file.platforms.is_empty() {
        return Err(ConfigError::Validation(
            "at least one platform must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for platform in &platforms_file.platforms {
        let name = platform.name();
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "platform name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate platform name: '{name}'"
            )));
        }

        let slug = platform.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "platform '{name}' does not produce a usable slug"
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate platform slug: '{slug}' (from platform '{name}')"
            )));
        }

        if let Some(endpoint) = platform.descriptor.endpoint() {
            validate_endpoint(name, endpoint)?;
        }
    }

    Ok(())
}

fn validate_endpoint(name: &str, endpoint: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        ConfigError::Validation(format!(
            "platform '{name}' has invalid endpoint '{endpoint}': {e}"
        ))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::Validation(format!(
            "platform '{name}' endpoint must be an absolute http(s) URL, got '{endpoint}'"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "platforms_test.rs"]
mod tests;

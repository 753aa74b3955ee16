//! Tunable thresholds for deduplication and radius expansion.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! documented behaviour. Example `place-scout.toml`:
//!
//! ```toml
//! [dedupe]
//! name_threshold = 85.0
//! proximity_m = 40.0
//!
//! [expansion]
//! min_results = 3
//! max_expansions = 2
//! radius_factor = 1.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// When two places count as the same venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupeConfig {
    /// Minimum token-sort name similarity, 0..=100 (inclusive)
    pub name_threshold: f64,
    /// Maximum planar distance in meters (inclusive)
    pub proximity_m: f64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            name_threshold: 85.0,
            proximity_m: 40.0,
        }
    }
}

/// When and how far the search radius grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// A round with fewer results than this triggers an expansion
    pub min_results: usize,
    /// Hard cap on expansion rounds
    pub max_expansions: u32,
    /// Radius multiplier applied per expansion
    pub radius_factor: f64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            min_results: 3,
            max_expansions: 2,
            radius_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dedupe: DedupeConfig,
    pub expansion: ExpansionConfig,
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `name_threshold` is within 0..=100
    /// - `proximity_m` is finite and not negative
    /// - `min_results` is at least 1
    /// - `radius_factor` is finite and greater than 1.0
    pub fn validate(&self) -> Result<()> {
        let dedupe = &self.dedupe;
        if !(0.0..=100.0).contains(&dedupe.name_threshold) {
            return Err(ConfigError::Invalid(format!(
                "dedupe.name_threshold must be within 0..=100, got {}",
                dedupe.name_threshold
            )));
        }
        if !dedupe.proximity_m.is_finite() || dedupe.proximity_m < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "dedupe.proximity_m must be a non-negative number, got {}",
                dedupe.proximity_m
            )));
        }
        let expansion = &self.expansion;
        if expansion.min_results == 0 {
            return Err(ConfigError::Invalid(
                "expansion.min_results must be at least 1".into(),
            ));
        }
        if !expansion.radius_factor.is_finite() || expansion.radius_factor <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "expansion.radius_factor must be greater than 1.0, got {}",
                expansion.radius_factor
            )));
        }
        Ok(())
    }
}

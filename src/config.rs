//! Analysis configuration
//!
//! Thresholds used by the comparators live here instead of being hardcoded
//! in each metric. A config is validated once and then passed by reference
//! into the key node detector and the path overlap metric.
//!
//! ## Example
//!
//! ```rust
//! use trajsim::AnalysisConfig;
//!
//! let config = AnalysisConfig::default()
//!     .with_low_health_ratio(0.25)
//!     .with_overlap_threshold(5.0);
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default health ratio below which a unit counts as critically damaged.
pub const DEFAULT_LOW_HEALTH_RATIO: f64 = 0.3;

/// Default distance (in map coordinate units) under which two positions overlap.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 10.0;

/// Tunable parameters for a pairwise analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// A unit with `health / max_health` strictly below this ratio emits a
    /// `low_health` key node. Must lie in `(0, 1]`.
    pub low_health_ratio: f64,
    /// Two positions closer than this (strictly) count towards path overlap.
    /// Must be finite and positive.
    pub overlap_threshold: f64,
    /// Compute pairs on the rayon pool. Ignored without the `rayon` feature.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            low_health_ratio: DEFAULT_LOW_HEALTH_RATIO,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Set the low health ratio.
    #[must_use]
    pub fn with_low_health_ratio(mut self, ratio: f64) -> Self {
        self.low_health_ratio = ratio;
        self
    }

    /// Set the path overlap distance threshold.
    #[must_use]
    pub fn with_overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    /// Enable or disable parallel pair computation.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that every threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the health ratio is outside `(0, 1]`
    /// or the overlap threshold is not a finite positive number.
    pub fn validate(&self) -> Result<()> {
        if !(self.low_health_ratio > 0.0 && self.low_health_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "low_health_ratio must be in (0, 1], got {}",
                self.low_health_ratio
            )));
        }
        if !(self.overlap_threshold.is_finite() && self.overlap_threshold > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "overlap_threshold must be finite and positive, got {}",
                self.overlap_threshold
            )));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON. Missing fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the values fail validation
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }
}

//! Controller configuration with documented constants
//!
//! Every timing and threshold value the controller uses lives here.
//! Values can be overridden from a TOML document; omitted keys keep
//! their defaults.

use crate::core::error::{DdaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for the difficulty controller
///
/// The defaults are the values the game ships with. Shorter intervals make
/// the controller react faster but also make it chase noise in the
/// player's telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdaConfig {
    // === SAMPLING ===
    /// Seconds of game time between performance samples
    pub performance_check_interval: f64,

    /// Maximum number of snapshots kept in history
    ///
    /// Only the last `decision_window` entries feed decisions; the rest
    /// exist for trend reporting and save files.
    pub history_capacity: usize,

    // === DECISION ===
    /// Minimum seconds of game time between two decision cycles
    pub adaptation_cooldown: f64,

    /// Number of most recent snapshots averaged for a decision
    pub decision_window: usize,

    /// Decisions are skipped until at least this many samples exist
    pub min_samples: usize,

    /// Dead zone around the target score inside which nothing changes
    ///
    /// At 0.05 a player scoring 0.47 on a 0.5 target profile is left alone.
    pub hysteresis_band: f64,

    // === STARTUP ===
    /// Registry key of the profile active after construction
    pub default_profile: String,
}

impl Default for DdaConfig {
    fn default() -> Self {
        Self {
            performance_check_interval: 30.0,
            history_capacity: 100,
            adaptation_cooldown: 60.0,
            decision_window: 10,
            min_samples: 3,
            hysteresis_band: 0.05,
            default_profile: "normal".to_string(),
        }
    }
}

impl DdaConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DdaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.performance_check_interval >= 0.0) || !(self.adaptation_cooldown >= 0.0) {
            return Err(DdaError::InvalidConfig(
                "intervals must be non-negative numbers".into(),
            ));
        }

        if self.history_capacity == 0 || self.decision_window == 0 {
            return Err(DdaError::InvalidConfig(
                "history_capacity and decision_window must be positive".into(),
            ));
        }

        if self.decision_window > self.history_capacity {
            return Err(DdaError::InvalidConfig(format!(
                "decision_window ({}) exceeds history_capacity ({})",
                self.decision_window, self.history_capacity
            )));
        }

        if self.min_samples == 0 || self.min_samples > self.decision_window {
            return Err(DdaError::InvalidConfig(format!(
                "min_samples ({}) must be in 1..={} (decision_window)",
                self.min_samples, self.decision_window
            )));
        }

        if !(0.0..1.0).contains(&self.hysteresis_band) {
            return Err(DdaError::InvalidConfig(format!(
                "hysteresis_band ({}) must be in [0, 1)",
                self.hysteresis_band
            )));
        }

        Ok(())
    }
}

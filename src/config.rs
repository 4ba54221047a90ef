// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Threshold configuration for the analytics evaluators.
//!
//! Defaults reproduce the engine's shipped behavior; a TOML file can
//! override any section. Missing sections and fields fall back to defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config file probed when no explicit path is given.
const DEFAULT_CONFIG_FILE: &str = "analytics_config.toml";

/// Root analytics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub overload: OverloadConfig,
    pub stagnation: StagnationConfig,
    pub recovery: RecoveryConfig,
    pub calories: CalorieConfig,
}

/// Progressive-overload evaluator thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverloadConfig {
    /// Identical consecutive sessions that count as stagnation
    pub stagnation_run: usize,
    /// Weight at or above which the heavier increment range applies (kg)
    pub heavy_bar_kg: f64,
    /// Suggest extra reps only below this per-set count
    pub rep_ceiling: u32,
    /// Suggest extra sets only below this count
    pub set_ceiling: u32,
}

impl Default for OverloadConfig {
    fn default() -> Self {
        Self {
            stagnation_run: 3,
            heavy_bar_kg: 20.0,
            rep_ceiling: 12,
            set_ceiling: 4,
        }
    }
}

/// Stagnation detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagnationConfig {
    /// Sessions inspected by the default stagnation check
    pub default_window: usize,
    /// Constant sessions required before the latest to call a plateau
    pub plateau_window: usize,
    /// Volume spread below this share of the window mean counts as stagnant
    pub volume_spread_ratio: f64,
    /// Minimum days between repeated stagnation notifications per exercise
    pub notify_cooldown_days: i64,
}

impl Default for StagnationConfig {
    fn default() -> Self {
        Self {
            default_window: 4,
            plateau_window: 4,
            volume_spread_ratio: 0.05,
            notify_cooldown_days: 7,
        }
    }
}

/// Rest/recovery evaluator thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Weekly per-group sessions above this warn about overtraining
    pub overtraining_sessions: usize,
    /// Weekly per-group range reported as optimal frequency
    pub optimal_min: usize,
    pub optimal_max: usize,
    /// Weekly total sessions above this warn about volume
    pub high_volume_sessions: usize,
    /// Vigorous share at or above this triggers the intensity warning
    pub vigorous_share: f64,
    /// Minimum weekly sessions before the intensity warning applies
    pub vigorous_min_sessions: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            overtraining_sessions: 5,
            optimal_min: 3,
            optimal_max: 5,
            high_volume_sessions: 6,
            vigorous_share: 0.70,
            vigorous_min_sessions: 4,
        }
    }
}

/// Calorie estimator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalorieConfig {
    /// Fallback MET for unknown activities
    pub default_met: f64,
}

impl Default for CalorieConfig {
    fn default() -> Self {
        Self { default_met: 5.0 }
    }
}

impl AnalyticsConfig {
    /// Load configuration from an explicit path, the default file if it
    /// exists, or embedded defaults.
    pub fn load(path: Option<String>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from_file(&config_path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::load_from_file(DEFAULT_CONFIG_FILE);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read analytics config file: {}", path))?;

        let config: AnalyticsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse analytics config file: {}", path))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_shipped_thresholds() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.overload.stagnation_run, 3);
        assert_eq!(config.overload.heavy_bar_kg, 20.0);
        assert_eq!(config.stagnation.default_window, 4);
        assert_eq!(config.stagnation.volume_spread_ratio, 0.05);
        assert_eq!(config.stagnation.notify_cooldown_days, 7);
        assert_eq!(config.recovery.overtraining_sessions, 5);
        assert_eq!(config.recovery.high_volume_sessions, 6);
        assert_eq!(config.recovery.vigorous_share, 0.70);
        assert_eq!(config.calories.default_met, 5.0);
    }

    #[test]
    fn test_partial_file_overrides_one_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[stagnation]\ndefault_window = 6\nnotify_cooldown_days = 14"
        )
        .unwrap();

        let config =
            AnalyticsConfig::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.stagnation.default_window, 6);
        assert_eq!(config.stagnation.notify_cooldown_days, 14);
        // Untouched sections and fields keep defaults
        assert_eq!(config.stagnation.volume_spread_ratio, 0.05);
        assert_eq!(config.overload.rep_ceiling, 12);
    }

    #[test]
    fn test_missing_file_is_an_error_with_context() {
        let err = AnalyticsConfig::load_from_file("/nonexistent/analytics.toml").unwrap_err();
        assert!(err.to_string().contains("analytics config"));
    }

    #[test]
    fn test_load_without_path_falls_back_to_defaults() {
        let config = AnalyticsConfig::load(None).unwrap();
        assert_eq!(config.recovery.optimal_min, 3);
    }
}

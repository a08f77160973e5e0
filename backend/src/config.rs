//! Engine configuration file support.
//!
//! Tunables for the filter, insight thresholds and trend classification are
//! read from a TOML file. Every field has a default, so an empty file (or no
//! file at all) yields the stock behaviour.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("No deck-engine.toml found in standard locations")]
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub insights: InsightSettings,
    #[serde(default)]
    pub trends: TrendSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub show_all_tiers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSettings {
    #[serde(default)]
    pub critical_threshold: usize,
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: usize,
    #[serde(default = "default_pending_threshold")]
    pub pending_threshold: usize,
    #[serde(default = "default_optimal_ratio_floor")]
    pub optimal_ratio_floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSettings {
    #[serde(default = "default_trend_window")]
    pub window: usize,
    #[serde(default = "default_change_threshold")]
    pub change_threshold: f64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_warning_threshold() -> usize {
    5
}

fn default_pending_threshold() -> usize {
    10
}

fn default_optimal_ratio_floor() -> f64 {
    0.5
}

fn default_trend_window() -> usize {
    3
}

fn default_change_threshold() -> f64 {
    0.10
}

fn default_history_capacity() -> usize {
    50
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            show_all_tiers: false,
        }
    }
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            critical_threshold: 0,
            warning_threshold: default_warning_threshold(),
            pending_threshold: default_pending_threshold(),
            optimal_ratio_floor: default_optimal_ratio_floor(),
        }
    }
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            window: default_trend_window(),
            change_threshold: default_change_threshold(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl FilterSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load engine configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if successful
    /// * `Err(ConfigError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Load engine configuration from the default location.
    ///
    /// Searches for `deck-engine.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("deck-engine.toml"),
            PathBuf::from("backend/deck-engine.toml"),
            PathBuf::from("../deck-engine.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Apply overrides from `DECK_DEBOUNCE_MS` and `DECK_SHOW_ALL_TIERS`.
    pub fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(val) = std::env::var("DECK_DEBOUNCE_MS") {
            self.filter.debounce_ms = val.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "DECK_DEBOUNCE_MS".to_string(),
                value: val.clone(),
            })?;
        }

        if let Ok(val) = std::env::var("DECK_SHOW_ALL_TIERS") {
            self.filter.show_all_tiers = match val.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "DECK_SHOW_ALL_TIERS".to_string(),
                        value: val,
                    })
                }
            };
        }

        Ok(self)
    }

    /// Default-location config if present, stock defaults otherwise, with
    /// environment overrides applied on top.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match Self::from_default_location() {
            Ok(config) => config,
            Err(ConfigError::NotFound) => Self::default(),
            Err(e) => return Err(e),
        };
        base.apply_env_overrides()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.filter.debounce(), Duration::from_millis(300));
        assert!(!config.filter.show_all_tiers);
        assert_eq!(config.insights.warning_threshold, 5);
        assert_eq!(config.insights.pending_threshold, 10);
        assert_eq!(config.trends.window, 3);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
[filter]
debounce_ms = 150

[insights]
pending_threshold = 3
"#;

        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.filter.debounce_ms, 150);
        assert!(!config.filter.show_all_tiers);
        assert_eq!(config.insights.pending_threshold, 3);
        assert_eq!(config.insights.warning_threshold, 5);
        assert_eq!(config.trends.change_threshold, 0.10);
    }

    #[test]
    fn test_invalid_type_is_rejected() {
        let toml = r#"
[filter]
debounce_ms = "fast"
"#;
        assert!(EngineConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = EngineConfig::from_file("/nonexistent/deck-engine.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/deck-engine.toml"));
    }
}

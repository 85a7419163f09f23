//! Engine configuration: window lengths, component weights, lookback policy.
//!
//! Tunables ship with sensible defaults and can be overridden from a TOML
//! file; the CLI looks in the platform config directory unless a path is
//! given explicitly.

use crate::error::{ReadyRsError, Result};
use crate::load::LoadConfig;
use crate::readiness::ReadinessWeights;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bounded lookback window for store queries, in days
    pub lookback_days: u16,

    /// How many days back a wellness entry may be and still stand in for the
    /// reference date
    pub wellness_staleness_days: u16,

    /// Training-load window configuration
    pub load: LoadConfig,

    /// Readiness component weights
    pub readiness: ReadinessWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            lookback_days: 90,
            wellness_staleness_days: 2,
            load: LoadConfig::default(),
            readiness: ReadinessWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Default config file location under the platform config directory
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            ReadyRsError::Configuration("no config directory available".to_string())
        })?;
        Ok(base.join("readyrs").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&contents)
            .map_err(|e| ReadyRsError::Configuration(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the given path, or fall back to defaults when no file exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_path()?;
                if default_path.exists() {
                    info!(path = %default_path.display(), "loading engine config");
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Persist configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ReadyRsError::Configuration(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Sanity-check the tunables
    pub fn validate(&self) -> Result<()> {
        if self.load.acute_window_days == 0 || self.load.chronic_window_days == 0 {
            return Err(ReadyRsError::Configuration(
                "load windows must be positive".to_string(),
            ));
        }
        if self.load.acute_window_days >= self.load.chronic_window_days {
            return Err(ReadyRsError::Configuration(format!(
                "acute window ({}d) must be shorter than chronic window ({}d)",
                self.load.acute_window_days, self.load.chronic_window_days
            )));
        }
        if self.lookback_days < self.load.chronic_window_days {
            return Err(ReadyRsError::Configuration(format!(
                "lookback ({}d) must cover the chronic window ({}d)",
                self.lookback_days, self.load.chronic_window_days
            )));
        }
        let weight_sum = self.readiness.sleep
            + self.readiness.hrv
            + self.readiness.recovery
            + self.readiness.wellness
            + self.readiness.workload;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(ReadyRsError::Configuration(format!(
                "readiness weights must sum to 1.0, got {}",
                weight_sum
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = EngineConfig::default();
        config.lookback_days = 120;
        config.load.min_history_days = 10;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "lookback_days = 60\n").unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.lookback_days, 60);
        assert_eq!(loaded.load, LoadConfig::default());
    }

    #[test]
    fn test_invalid_windows_rejected() {
        let mut config = EngineConfig::default();
        config.load.acute_window_days = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unbalanced_weights_rejected() {
        let mut config = EngineConfig::default();
        config.readiness.sleep = 0.5;
        assert!(config.validate().is_err());
    }
}

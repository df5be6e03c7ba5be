use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::forecast::ForecastCalibration;
use crate::logging::LogConfig;
use crate::performance::DEFAULT_HISTORY_DAYS;
use crate::recovery::RecoveryThresholds;
use crate::risk::RiskThresholds;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Forecasting and recommendation settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Tunables for the prediction engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Days of completion history requested per forecast
    pub history_days: u32,

    /// Days ahead a critical date may fall and still trigger a nudge
    pub nudge_horizon_days: u32,

    pub forecast: ForecastCalibration,
    pub risk: RiskThresholds,
    pub recovery: RecoveryThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            history_days: DEFAULT_HISTORY_DAYS,
            nudge_horizon_days: 3,
            forecast: ForecastCalibration::default(),
            risk: RiskThresholds::default(),
            recovery: RecoveryThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Reject calibrations the engine cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.history_days == 0 {
            return Err(crate::StreakRsError::Configuration(
                "history_days must be at least 1".to_string(),
            ));
        }
        self.forecast
            .validate()
            .and_then(|_| self.risk.validate())
            .and_then(|_| self.recovery.validate())
            .map_err(crate::StreakRsError::Configuration)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            engine: EngineConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.engine.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".streakrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %err,
                    "Config not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.engine, deserialized.engine);
        assert_eq!(config.logging, deserialized.logging);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml_str = r#"
            [metadata]
            version = "1.0"
            created_at = "2024-04-10T08:00:00Z"
            updated_at = "2024-04-10T08:00:00Z"

            [engine]
            history_days = 21

            [engine.forecast]
            weekend_penalty = 0.85
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.engine.history_days, 21);
        assert_eq!(config.engine.forecast.weekend_penalty, 0.85);
        assert_eq!(config.engine.forecast.base_seasonal, 0.7);
        assert_eq!(config.engine.recovery.gradual_buildup_max, 14);
    }

    #[test]
    fn test_engine_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let mut config = EngineConfig::default();
        config.history_days = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.recovery.quick_restart_max = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.engine.nudge_horizon_days = 5;
        original.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.engine.nudge_horizon_days, 5);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.engine.forecast.month_factors = vec![1.0; 3];
        config.save_to_file(&config_path).unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());
    }
}

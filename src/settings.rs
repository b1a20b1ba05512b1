//! # Settings Module
//!
//! ## Purpose
//! Holds the physical constants used by the electrochemical calculations and the log level
//! of the command line tool. Values are read from `molcalc_config.json` in the working
//! directory when the file exists; otherwise defaults are used.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "faraday_constant": 96485.0,
//!   "stored_energy_kwh": 1.0,
//!   "log_level": "info"
//! }
//! ```
//! Missing keys take their default values.
//!
//! ## Global Access
//! The binary loads the configuration once and installs it with `init_config`; afterwards
//! `config()` hands out a shared read-only reference. The file is never written back.

use crate::calc_api::CalcError;
use crate::Electrochemistry::flow_battery::FARADAY_CONSTANT;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_CONFIG_FILE: &str = "molcalc_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    /// C/mol
    pub faraday_constant: f64,
    /// energy the active material mass is calculated for, kWh
    pub stored_energy_kwh: f64,
    /// one of off, error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            faraday_constant: FARADAY_CONSTANT,
            stored_energy_kwh: 1.0,
            log_level: "info".to_string(),
        }
    }
}

impl CalcConfig {
    pub fn validate(&self) -> Result<(), CalcError> {
        for (name, value) in [
            ("faraday_constant", self.faraday_constant),
            ("stored_energy_kwh", self.stored_energy_kwh),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(CalcError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, CalcError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| CalcError::Config(format!("unknown log level '{}'", self.log_level)))
    }
}

/// Loads the configuration file and validates it
#[derive(Debug, Clone)]
pub struct SettingsManager {
    config: CalcConfig,
}

impl SettingsManager {
    /// reads `molcalc_config.json` from the working directory
    pub fn new() -> Result<Self, CalcError> {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    pub fn with_config_file(config_file: &str) -> Result<Self, CalcError> {
        let config = Self::load_config(config_file)?;
        Ok(Self { config })
    }

    fn load_config(config_file: &str) -> Result<CalcConfig, CalcError> {
        if !Path::new(config_file).exists() {
            return Ok(CalcConfig::default());
        }
        let content = fs::read_to_string(config_file)
            .map_err(|e| CalcError::Config(format!("failed to read '{}': {}", config_file, e)))?;
        let config: CalcConfig = serde_json::from_str(&content)
            .map_err(|e| CalcError::Config(format!("failed to parse '{}': {}", config_file, e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn get_config(&self) -> &CalcConfig {
        &self.config
    }

    pub fn into_config(self) -> CalcConfig {
        self.config
    }
}

static GLOBAL_CONFIG: OnceLock<CalcConfig> = OnceLock::new();

/// Installs the process-wide configuration. Only the first call has an effect; returns
/// false if a configuration was already installed.
pub fn init_config(config: CalcConfig) -> bool {
    GLOBAL_CONFIG.set(config).is_ok()
}

/// process-wide configuration, defaults if `init_config` was never called
pub fn config() -> &'static CalcConfig {
    GLOBAL_CONFIG.get_or_init(CalcConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let manager = SettingsManager::with_config_file("no_such_dir/molcalc_config.json").unwrap();
        assert_eq!(manager.get_config(), &CalcConfig::default());
        assert_eq!(manager.get_config().faraday_constant, 96485.0);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_config = NamedTempFile::new().unwrap();
        temp_config
            .write_all(br#"{"faraday_constant": 96485.33212, "log_level": "debug"}"#)
            .unwrap();
        let manager =
            SettingsManager::with_config_file(temp_config.path().to_str().unwrap()).unwrap();
        let config = manager.into_config();
        assert_eq!(config.faraday_constant, 96485.33212);
        assert_eq!(config.stored_energy_kwh, 1.0);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut temp_config = NamedTempFile::new().unwrap();
        temp_config.write_all(br#"{"stored_energy_kwh": 0}"#).unwrap();
        let result = SettingsManager::with_config_file(temp_config.path().to_str().unwrap());
        assert!(matches!(result, Err(CalcError::Config(_))));

        let mut broken = NamedTempFile::new().unwrap();
        broken.write_all(b"{ faraday").unwrap();
        let result = SettingsManager::with_config_file(broken.path().to_str().unwrap());
        assert!(matches!(result, Err(CalcError::Config(_))));

        let config = CalcConfig {
            log_level: "loud".to_string(),
            ..CalcConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_global_config_defaults() {
        // no test installs a global config, so the defaults are visible
        assert_eq!(config().stored_energy_kwh, 1.0);
    }
}

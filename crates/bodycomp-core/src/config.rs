//! Import configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Knobs for the reconciliation step. Every field has a default, so a
/// partial JSON file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImportConfig {
    /// Maximum height difference (cm, inclusive) for a patient match
    pub height_tolerance_cm: f64,
    /// Name given to patients created from a slot: "{prefix} {slot}"
    pub placeholder_name_prefix: String,
    /// Skip weigh-ins already stored for the same patient
    pub skip_duplicate_measurements: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            height_tolerance_cm: 2.0,
            placeholder_name_prefix: "Tanita Slot".into(),
            skip_duplicate_measurements: false,
        }
    }
}

impl ImportConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.height_tolerance_cm.is_finite() || self.height_tolerance_cm < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "height_tolerance_cm must be a non-negative number, got {}",
                self.height_tolerance_cm
            )));
        }
        if self.placeholder_name_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "placeholder_name_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Placeholder name for a patient created from `slot`.
    pub fn placeholder_name(&self, slot: u8) -> String {
        format!("{} {}", self.placeholder_name_prefix.trim(), slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.height_tolerance_cm, 2.0);
        assert!(!config.skip_duplicate_measurements);
        assert_eq!(config.placeholder_name(3), "Tanita Slot 3");
    }

    #[test]
    fn test_partial_json() {
        let config = ImportConfig::from_json(r#"{"skip_duplicate_measurements": true}"#).unwrap();
        assert!(config.skip_duplicate_measurements);
        assert_eq!(config.height_tolerance_cm, 2.0);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ImportConfig::from_json(r#"{"height_tolerance_cm": -1}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ImportConfig::from_json(r#"{"placeholder_name_prefix": "  "}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ImportConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{"height_tolerance_cm": 1.5}"#).unwrap();
        let config = ImportConfig::from_json_file(tmp.path()).unwrap();
        assert_eq!(config.height_tolerance_cm, 1.5);
    }
}

//! Scanner configuration file format.

use crate::camera::CameraConstraints;
use crate::error::ConfigError;
use crate::scan::ScanOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScannerConfig {
    #[serde(default)]
    pub scan: ScanOptions,
    #[serde(default)]
    pub camera: CameraConstraints,
}

impl ScannerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: ScannerConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        self.camera.validate()?;
        Ok(())
    }
}

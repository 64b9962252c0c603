//! Layered configuration loading from file, environment, and defaults —
//! the same three-tier approach the teacher crate used for its own
//! configuration.

pub mod error;
pub mod logging;
pub mod rotation;
pub mod startup;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use rotation::RotationConfig;
pub use startup::StartupConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ControlPlaneConfig {
    pub startup: StartupConfig,
    pub logging: LoggingConfig,
    pub rotation: RotationConfig,
}

impl ControlPlaneConfig {
    /// Loads from `path`, or returns defaults if `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies `AIGW_*` environment variable overrides. Invalid values are
    /// silently ignored, keeping whatever the file (or default) set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("AIGW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("AIGW_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Ok(image) = std::env::var("AIGW_EXTPROC_IMAGE") {
            self.startup.extproc_image = image;
        }
        if let Ok(uds_path) = std::env::var("AIGW_UDS_PATH") {
            self.startup.uds_path = uds_path;
        }
        if let Ok(namespace) = std::env::var("AIGW_GATEWAY_SYSTEM_NAMESPACE") {
            self.startup.envoy_gateway_system_namespace = namespace;
        }
        if let Ok(seconds) = std::env::var("AIGW_PRE_ROTATION_WINDOW_SECONDS") {
            if let Ok(s) = seconds.parse() {
                self.rotation.pre_rotation_window_seconds = s;
            }
        }

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.startup.extproc_image.is_empty() {
            return Err(ConfigError::Validation {
                field: "startup.extproc_image".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.startup.uds_path.is_empty() {
            return Err(ConfigError::Validation {
                field: "startup.uds_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.startup.envoy_gateway_system_namespace.is_empty() {
            return Err(ConfigError::Validation {
                field: "startup.envoy_gateway_system_namespace".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.rotation.pre_rotation_window_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "rotation.pre_rotation_window_seconds".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}

//! Configuration management for dgate
//!
//! Provides a strongly-typed configuration with TOML support.

use crate::error::{Error, Result};
use crate::filter::TOO_MANY_RULES_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter settings
    pub filter: FilterConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.filter.too_many_rules_threshold == 0 {
            return Err(Error::config_value(
                "filter.too_many_rules_threshold",
                "Must be at least 1",
            ));
        }

        if let Some(level) = &self.logging.level {
            match level.to_lowercase().as_str() {
                "error" | "warn" | "info" | "debug" | "trace" => {}
                _ => {
                    return Err(Error::config_value(
                        "logging.level",
                        format!("Unknown level: {level}"),
                    ))
                }
            }
        }

        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Filter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Rule count above which users are warned. Advisory only.
    pub too_many_rules_threshold: usize,
    /// Filter file to operate on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_file: Option<PathBuf>,
    /// Service registry file used for cleanup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_file: Option<PathBuf>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            too_many_rules_threshold: TOO_MANY_RULES_THRESHOLD,
            filter_file: None,
            registry_file: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when neither flags nor `RUST_LOG` set one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

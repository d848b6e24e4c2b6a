//! Error types for dgate-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// Main error type for dgate-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Serialized filter could not be decoded
    #[error("Malformed filter data: {message}")]
    Format {
        /// Detailed error message
        message: String,
        /// Index of the offending rule pair, if known
        index: Option<usize>,
    },

    /// Serialized filter carries a version this build cannot read
    #[error("Unsupported filter version: {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the envelope
        found: u32,
        /// Version this build writes and reads
        supported: u32,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Hex decoding error
    #[error("Hex decoding error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
            index: None,
        }
    }

    /// Create a format error pointing at a specific rule pair
    pub fn format_at(message: impl Into<String>, index: usize) -> Self {
        Self::Format {
            message: message.into(),
            index: Some(index),
        }
    }

    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the stored filter data is unreadable
    /// (as opposed to an environment problem such as I/O)
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Self::Format { .. } | Self::UnsupportedVersion { .. } | Self::Json(_) | Self::HexDecode(_)
        )
    }
}

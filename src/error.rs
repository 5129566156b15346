use thiserror::Error;

/// Main error type for lokigen operations
#[derive(Debug, Error)]
pub enum LokigenError {
    #[error("Missing required field: {field}")]
    MissingRequiredField { field: String },

    #[error("Invalid deployment mode '{value}' (expected one of: single, singlebinary, distributed, dist)")]
    InvalidMode { value: String },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoadError(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LokigenError {
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    pub fn invalid_mode<S: Into<String>>(value: S) -> Self {
        Self::InvalidMode {
            value: value.into(),
        }
    }

    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::EncodingError(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Result type alias for lokigen operations
pub type Result<T> = std::result::Result<T, LokigenError>;

impl From<serde_yaml::Error> for LokigenError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::EncodingError(error.to_string())
    }
}

impl From<toml::ser::Error> for LokigenError {
    fn from(error: toml::ser::Error) -> Self {
        Self::ConfigError(format!("Failed to serialize settings: {error}"))
    }
}

impl From<dialoguer::Error> for LokigenError {
    fn from(error: dialoguer::Error) -> Self {
        Self::ConfigError(format!("Failed to get user input: {error}"))
    }
}

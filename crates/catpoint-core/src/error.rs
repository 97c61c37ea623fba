//! Error types for Catpoint Core
//!
//! The alarm rules themselves never fail. Everything here originates at a
//! boundary (the repository, the image analyzer, configuration files) and
//! is propagated unchanged to the caller of the triggering operation.

use thiserror::Error;

use crate::sensor::SensorType;

/// Result type alias for Catpoint operations
pub type Result<T> = std::result::Result<T, CatpointError>;

/// Main error type for Catpoint operations
#[derive(Error, Debug)]
pub enum CatpointError {
    /// The persistence boundary failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// The image analyzer failed
    #[error("Image analysis failed: {0}")]
    ImageAnalysis(String),

    /// An image could not be read or was empty
    #[error("Unreadable image: {0}")]
    UnreadableImage(String),

    #[error("Sensor not found: {name} ({sensor_type})")]
    SensorNotFound {
        name: String,
        sensor_type: SensorType,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CatpointError {
    fn from(e: serde_json::Error) -> Self {
        CatpointError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for CatpointError {
    fn from(e: toml::de::Error) -> Self {
        CatpointError::Serialization(e.to_string())
    }
}

impl From<toml::ser::Error> for CatpointError {
    fn from(e: toml::ser::Error) -> Self {
        CatpointError::Serialization(e.to_string())
    }
}

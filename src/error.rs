//! Error types for steel-toes
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in steel-toes
#[derive(Debug, Error)]
pub enum SteelToesError {
    /// Catalog could not be read or a dataset could not be updated
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration file problem
    #[error("Config error: {0}")]
    Config(String),

    /// Backing store refused an existence check or delete
    #[error("Filesystem error: {0}")]
    FileSystem(String),

    /// Host project could not be bootstrapped
    #[error("Context error: {0}")]
    Context(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for steel-toes operations
pub type Result<T> = std::result::Result<T, SteelToesError>;

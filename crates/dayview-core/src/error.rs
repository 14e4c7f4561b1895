//! Core error types for dayview-core.
//!
//! The layout engine itself never fails for well-formed input. The errors
//! here cover internal-consistency violations detected while allocating
//! columns (which abort a single recompute), configuration loading, and
//! input validation at the edges of the library.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dayview-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Layout recompute errors
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Internal-consistency violations raised while building a layout.
///
/// These indicate a defect in the allocator rather than bad input. The
/// column that hits one keeps publishing its previous layout tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A column index fell outside the blob's tracked columns
    #[error("Column index {index} out of range for blob with {total_cols} columns")]
    ColumnOutOfRange { index: usize, total_cols: usize },

    /// The column tracker referenced an assignment that is not in the blob
    #[error("Column tracker references missing assignment {index} (blob has {len})")]
    MissingAssignment { index: usize, len: usize },

    /// A recompute was requested while one was already running
    #[error("Layout recompute re-entered while already recomputing")]
    Reentrant,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Unknown IANA timezone name
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
///
/// Every step-level failure ends up as the terminal error message of the
/// owning task, so the `Display` text is what callers see verbatim.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Plan references a capability that is not registered
    #[error("No tool registered for '{name}'")]
    UnknownTool { name: String },

    /// Required file or parameter absent
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Referenced media (source video, music, clip) does not exist on disk
    #[error("File not found: {path}")]
    AssetNotFound { path: String },

    /// Underlying media transform failed
    #[error("Media transform failed: {0}")]
    Transform(String),

    /// Planner oracle returned a malformed or empty plan
    #[error("Planner error: {0}")]
    Planner(String),

    /// Request failed validation before any work started
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Shorthand for a missing file at `path`
    pub fn asset_not_found(path: impl AsRef<std::path::Path>) -> Self {
        DomainError::AssetNotFound {
            path: path.as_ref().display().to_string(),
        }
    }
}

//! Error types for the s3smoke CLI
//!
//! Failures of individual test steps never surface here; they are recorded as
//! failed steps by the harness. These errors stop the program before any step
//! runs.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that abort the whole run
#[derive(Error, Debug)]
pub enum CliError {
    /// Endpoint or credentials could not be resolved from args or environment
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    /// The S3 client could not be constructed
    #[error("Failed to create S3 client: {0}")]
    ClientInit(String),
}

impl CliError {
    /// Create a client initialization error
    pub fn client_init(msg: impl Into<String>) -> Self {
        Self::ClientInit(msg.into())
    }
}

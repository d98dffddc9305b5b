//! Error types for radiation setup and launch.

use farfield_core::CoreError;
use thiserror::Error;

/// Result type for radiation operations.
pub type Result<T> = std::result::Result<T, RadiationError>;

/// Errors detected before the radiation kernel runs.
///
/// The kernel itself has no error path: non-finite values produced by the
/// radiation formula propagate into the output buffer unflagged.
#[derive(Error, Debug)]
pub enum RadiationError {
    /// Configuration error.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Shape of an input does not match the launch.
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which input.
        what: &'static str,
        /// Expected size.
        expected: usize,
        /// Actual size.
        actual: usize,
    },

    /// Execution model error.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Configuration parse error.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RadiationError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            actual,
        }
    }
}

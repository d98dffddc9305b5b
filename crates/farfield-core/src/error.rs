//! Error types for kernel launch and execution setup.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised before a kernel starts executing.
///
/// Once a launch is accepted the kernel always runs to completion; there is
/// no error path inside a running block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Launch or memory configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The launcher refused to start the kernel.
    #[error("Launch failed: {0}")]
    LaunchFailed(String),
}

impl CoreError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a launch failure error.
    pub fn launch_failed(msg: impl Into<String>) -> Self {
        Self::LaunchFailed(msg.into())
    }
}

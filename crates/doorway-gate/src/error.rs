//! Error types for the gate runtime.

use doorway_hardware::HardwareError;
use thiserror::Error;

/// Result type alias for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors surfaced by the supervisor.
///
/// Per-attempt failures never show up here: device errors are logged by the
/// source loops and verification failures become a denied outcome.
#[derive(Debug, Error)]
pub enum GateError {
    /// A peripheral could not be driven or read.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// OS signal handlers could not be installed.
    #[error("Failed to install shutdown signal handler: {0}")]
    Signal(#[source] std::io::Error),

    /// A source task panicked.
    #[error("{count} source task(s) panicked")]
    TaskPanicked { count: usize },
}

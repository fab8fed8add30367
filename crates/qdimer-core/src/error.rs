//! Error types for the core crate.

use qdimer_hal::HalError;
use qdimer_ir::IrError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while deriving weights, building circuits or running them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A physical parameter set could not be turned into weights.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Circuit construction failed.
    #[error("Circuit error: {0}")]
    Circuit(#[from] IrError),

    /// Backend error.
    #[error(transparent)]
    Backend(#[from] HalError),

    /// The backend returned counts that do not fit a two-bit histogram.
    #[error("Unexpected outcome '{outcome}' from backend")]
    UnexpectedOutcome { outcome: String },

    /// The backend returned a different number of shots than requested.
    #[error("Shot count mismatch: requested {requested}, received {received}")]
    ShotMismatch { requested: u64, received: u64 },

    /// Configuration could not be loaded or is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An existing results log has a header other than the one this run writes.
    #[error("Results log {path} has header '{found}', expected '{expected}'")]
    LogHeaderMismatch {
        path: String,
        found: String,
        expected: String,
    },

    /// I/O error writing the results log.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

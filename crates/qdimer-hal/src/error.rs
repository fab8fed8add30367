//! Error types for the HAL crate.

use thiserror::Error;

/// Errors raised by backends, the registry and token providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    // Backend lookup and access
    /// No backend by that name, or it is offline.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// The device rejected the credential.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No credential source produced a token.
    #[error("No credential: {0}")]
    Auth(String),

    // Circuit and shot limits
    /// The backend cannot execute this circuit.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// More qubits than the backend offers.
    #[error("Circuit too large: {0}")]
    CircuitTooLarge(String),

    /// Shot count outside `1..=max_shots`.
    #[error("Invalid shot count: {0}")]
    InvalidShots(String),

    // Job lifecycle
    /// The backend refused the job.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// The job ran and failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The job was cancelled before it finished.
    #[error("Job cancelled")]
    JobCancelled,

    /// The backend has no record of the job.
    #[error("Unknown job: {0}")]
    JobNotFound(String),

    /// Polling gave up before the job reached a terminal state.
    #[error("Gave up waiting for job {0}")]
    Timeout(String),

    // Transport
    /// HTTP transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed JSON payload.
    #[error("Malformed payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else the backend reported.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl HalError {
    /// True for errors that mean the credential is missing or refused.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, HalError::Auth(_) | HalError::AuthenticationFailed(_))
    }
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;

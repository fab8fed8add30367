//! The device abstraction every dimer circuit runs through.
//!
//! Callers validate a circuit once, then for each shot batch call
//! [`Backend::submit`] followed by [`Backend::wait`]. The provided `wait`
//! polls [`Backend::status`] on the schedule the device asks for and fetches
//! counts with [`Backend::result`] once the job completes.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use qdimer_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Settings handed to a [`BackendFactory`].
///
/// Device-specific knobs (the simulator seed, for one) travel in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Device name as registered.
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Settings with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Attach a device-specific setting.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Look up a device-specific setting as an unsigned integer.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(serde_json::Value::as_u64)
    }
}

/// A device that executes two-qubit circuits and reports bitstring counts.
///
/// `capabilities` is fixed when the backend is built. Jobs returned by
/// `submit` start out `Queued`; `result` is only meaningful after `status`
/// reports `Completed`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Registry name, also written to the `backend` CSV column.
    fn name(&self) -> &str;

    /// Static device limits, including the per-job shot cap.
    fn capabilities(&self) -> &Capabilities;

    /// Whether the device is online and how long its queue is.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check qubit count, gate set and measurements before any submission.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Queue one batch of `shots` repetitions.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Counts of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Poll interval and poll limit used by [`Backend::wait`].
    ///
    /// The default gives up after five minutes.
    fn poll_schedule(&self) -> (Duration, u32) {
        (Duration::from_millis(500), 600)
    }

    /// Block until the job leaves the queue, then return its counts.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let (poll_interval, max_polls) = self.poll_schedule();

        for _ in 0..max_polls {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.0.clone()))
    }
}

/// Snapshot of a device's queue, used to pick the least busy one.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    pub is_available: bool,
    /// Pending jobs, when the device reports it.
    pub queue_depth: Option<u32>,
    pub estimated_wait: Option<Duration>,
    /// Why the device is offline, if it is.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// A local device with nothing queued.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// An online device with `queue_depth` jobs ahead.
    pub fn queued(queue_depth: u32) -> Self {
        Self {
            is_available: true,
            queue_depth: Some(queue_depth),
            estimated_wait: None,
            status_message: None,
        }
    }

    /// An offline device.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Outcome of [`Backend::validate`].
#[derive(Debug, Clone)]
pub enum ValidationResult {
    Valid,
    /// Every problem found, in instruction order.
    Invalid { reasons: Vec<String> },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Backends the registry can build lazily from [`BackendConfig`].
pub trait BackendFactory: Backend + Sized {
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("simulator").with_extra("seed", serde_json::json!(42));

        assert_eq!(config.name, "simulator");
        assert_eq!(config.extra_u64("seed"), Some(42));
        assert_eq!(config.extra_u64("missing"), None);
    }

    #[test]
    fn test_backend_config_flattens_extras() {
        let config = BackendConfig::new("simulator").with_extra("seed", serde_json::json!(7));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({"name": "simulator", "seed": 7}));
    }

    #[test]
    fn test_backend_availability() {
        let avail = BackendAvailability::always_available();
        assert!(avail.is_available);
        assert_eq!(avail.queue_depth, Some(0));

        let queued = BackendAvailability::queued(17);
        assert_eq!(queued.queue_depth, Some(17));

        let down = BackendAvailability::unavailable("maintenance");
        assert!(!down.is_available);
        assert_eq!(down.status_message, Some("maintenance".to_string()));
    }

    #[test]
    fn test_validation_result_is_valid() {
        assert!(ValidationResult::Valid.is_valid());
        assert!(!ValidationResult::Invalid { reasons: vec![] }.is_valid());
    }
}

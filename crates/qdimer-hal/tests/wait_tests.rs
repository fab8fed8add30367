use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use qdimer_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult,
    JobId, JobStatus, ValidationResult,
};
use qdimer_ir::Circuit;

/// Reports `Queued` for a fixed number of polls, then a terminal status.
struct ScriptedBackend {
    polls_until_done: u32,
    terminal: JobStatus,
    polls: AtomicU32,
    capabilities: Capabilities,
}

impl ScriptedBackend {
    fn new(polls_until_done: u32, terminal: JobStatus) -> Self {
        Self {
            polls_until_done,
            terminal,
            polls: AtomicU32::new(0),
            capabilities: Capabilities::simulator(2),
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::Valid)
    }

    async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
        Ok(JobId::new("scripted-1"))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        if n < self.polls_until_done {
            Ok(JobStatus::Queued)
        } else {
            Ok(self.terminal.clone())
        }
    }

    async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
        Ok(ExecutionResult::new(Counts::from_pairs([("00", 7)]), 7))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }

    fn poll_schedule(&self) -> (Duration, u32) {
        (Duration::from_millis(10), 5)
    }
}

#[tokio::test(start_paused = true)]
async fn wait_returns_result_after_queue() {
    let backend = ScriptedBackend::new(3, JobStatus::Completed);
    let result = backend.wait(&JobId::new("scripted-1")).await.unwrap();
    assert_eq!(result.counts.get("00"), 7);
    assert_eq!(backend.polls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn wait_surfaces_failure() {
    let backend = ScriptedBackend::new(1, JobStatus::Failed("calibration".into()));
    let err = backend.wait(&JobId::new("scripted-1")).await.unwrap_err();
    assert!(matches!(err, HalError::JobFailed(msg) if msg == "calibration"));
}

#[tokio::test(start_paused = true)]
async fn wait_surfaces_cancellation() {
    let backend = ScriptedBackend::new(0, JobStatus::Cancelled);
    let err = backend.wait(&JobId::new("scripted-1")).await.unwrap_err();
    assert!(matches!(err, HalError::JobCancelled));
}

#[tokio::test(start_paused = true)]
async fn wait_times_out() {
    let backend = ScriptedBackend::new(100, JobStatus::Completed);
    let err = backend.wait(&JobId::new("scripted-1")).await.unwrap_err();
    assert!(matches!(err, HalError::Timeout(id) if id == "scripted-1"));
}

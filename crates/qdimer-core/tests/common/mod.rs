//! Test backends shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use qdimer_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult,
    JobId, JobStatus, ValidationResult,
};
use qdimer_ir::Circuit;

/// Counts a [`RecordingBackend`] returns for a batch of `n` shots.
pub fn split(n: u32) -> [u64; 4] {
    let n = u64::from(n);
    let n00 = n / 2;
    let n01 = n / 8;
    let n10 = n / 8;
    [n00, n01, n10, n - n00 - n01 - n10]
}

/// Backend that records every submitted batch size and answers with
/// [`split`].
pub struct RecordingBackend {
    capabilities: Capabilities,
    submitted: Mutex<Vec<u32>>,
    results: Mutex<HashMap<String, ExecutionResult>>,
    fail_on_call: Option<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities::simulator(2),
            submitted: Mutex::new(Vec::new()),
            results: Mutex::new(HashMap::new()),
            fail_on_call: None,
        }
    }

    pub fn with_max_shots(mut self, max_shots: u32) -> Self {
        self.capabilities = self.capabilities.with_max_shots(max_shots);
        self
    }

    /// Make the n-th submission (zero-based) fail.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn submitted(&self) -> Vec<u32> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
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

    async fn submit(&self, _circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        let mut submitted = self.submitted.lock().unwrap();
        if self.fail_on_call == Some(submitted.len()) {
            return Err(HalError::SubmissionFailed("device offline".into()));
        }
        submitted.push(shots);

        let id = format!("job-{}", submitted.len());
        let [n00, n01, n10, n11] = split(shots);
        let counts = Counts::from_pairs([("00", n00), ("01", n01), ("10", n10), ("11", n11)]);
        self.results
            .lock()
            .unwrap()
            .insert(id.clone(), ExecutionResult::new(counts, shots));
        Ok(JobId::new(id))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        Ok(JobStatus::Completed)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.results
            .lock()
            .unwrap()
            .get(&job_id.0)
            .cloned()
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

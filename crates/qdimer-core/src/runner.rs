//! Shot batching against a backend.

use qdimer_hal::{Backend, HalError, ValidationResult};
use qdimer_ir::Circuit;
use tracing::{debug, info, instrument};

use crate::error::{CoreError, CoreResult};
use crate::histogram::OutcomeHistogram;

/// Largest number of shots sent in a single job.
pub const MAX_SHOTS_PER_CALL: u32 = 8000;

/// Split `shots` into job sizes of at most `cap`.
///
/// Every batch is `cap` except possibly the last. Zero shots yields no
/// batches.
pub fn batch_sizes(shots: u64, cap: u32) -> Vec<u32> {
    if cap == 0 {
        return Vec::new();
    }
    let mut batches = Vec::with_capacity(shots.div_ceil(u64::from(cap)) as usize);
    let mut remaining = shots;
    while remaining > 0 {
        let batch = remaining.min(u64::from(cap)) as u32;
        batches.push(batch);
        remaining -= u64::from(batch);
    }
    batches
}

/// Runs circuits on a backend one batch at a time and sums the outcomes.
#[derive(Debug, Clone, Copy)]
pub struct CircuitRunner {
    max_shots_per_call: u32,
}

impl Default for CircuitRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitRunner {
    /// Runner with the default per-call cap.
    pub fn new() -> Self {
        Self {
            max_shots_per_call: MAX_SHOTS_PER_CALL,
        }
    }

    /// Override the per-call cap.
    pub fn with_max_shots_per_call(mut self, max_shots_per_call: u32) -> Self {
        self.max_shots_per_call = max_shots_per_call;
        self
    }

    /// The configured per-call cap before the backend limit is applied.
    pub fn max_shots_per_call(&self) -> u32 {
        self.max_shots_per_call
    }

    /// Effective per-call cap for `backend`.
    pub fn cap_for(&self, backend: &dyn Backend) -> u32 {
        self.max_shots_per_call.min(backend.capabilities().max_shots)
    }

    /// Execute `circuit` for `shots` shots and return the summed histogram.
    ///
    /// Batches are submitted and awaited one after another. The first
    /// backend error aborts the run.
    #[instrument(skip(self, backend, circuit), fields(backend = backend.name(), circuit = circuit.name()))]
    pub async fn run(
        &self,
        backend: &dyn Backend,
        circuit: &Circuit,
        shots: u64,
    ) -> CoreResult<OutcomeHistogram> {
        let cap = self.cap_for(backend);
        if cap == 0 {
            return Err(HalError::InvalidShots(format!(
                "backend '{}' accepts no shots per call",
                backend.name()
            ))
            .into());
        }

        if let ValidationResult::Invalid { reasons } = backend.validate(circuit).await? {
            return Err(HalError::InvalidCircuit(reasons.join("; ")).into());
        }

        let batches = batch_sizes(shots, cap);
        let mut histogram = OutcomeHistogram::new();

        for (index, &batch) in batches.iter().enumerate() {
            debug!(batch = index + 1, of = batches.len(), shots = batch, "submitting");
            let job_id = backend.submit(circuit, batch).await?;
            let result = backend.wait(&job_id).await?;

            let partial = OutcomeHistogram::from_counts(&result.counts)?;
            if partial.total() != u64::from(batch) {
                return Err(CoreError::ShotMismatch {
                    requested: u64::from(batch),
                    received: partial.total(),
                });
            }
            histogram += partial;
        }

        info!(shots, batches = batches.len(), "run complete");
        Ok(histogram)
    }
}

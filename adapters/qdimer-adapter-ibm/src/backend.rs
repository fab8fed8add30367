//! IBM Quantum backend implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument, warn};

use qdimer_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult,
    JobId, JobStatus, ValidationResult,
};
use qdimer_ir::{Circuit, qasm};

use crate::api::{BackendInfo, IbmClient, JobResultResponse, JobStatusResponse};
use crate::error::{IbmError, IbmResult};

/// IBM Quantum backend adapter bound to one device.
pub struct IbmBackend {
    client: Arc<IbmClient>,
    target: String,
    capabilities: Capabilities,
    /// Classical register width of each submitted job.
    clbit_widths: Mutex<FxHashMap<String, usize>>,
}

impl IbmBackend {
    /// Create a backend from a device listing entry, sharing the client.
    pub fn from_info(client: Arc<IbmClient>, info: &BackendInfo) -> Self {
        let mut capabilities = Capabilities::ibm(&info.name, info.num_qubits as u32);
        if let Some(max_shots) = info.max_shots {
            capabilities = capabilities.with_max_shots(max_shots);
        }
        capabilities.is_simulator = info.simulator;
        Self::from_parts(client, info.name.clone(), capabilities)
    }

    fn from_parts(client: Arc<IbmClient>, target: String, capabilities: Capabilities) -> Self {
        Self {
            client,
            target,
            capabilities,
            clbit_widths: Mutex::new(FxHashMap::default()),
        }
    }

    /// List devices visible to `client`.
    pub async fn list_devices(client: &IbmClient) -> IbmResult<Vec<BackendInfo>> {
        let mut devices = client.list_backends().await?;
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(devices)
    }

    /// Get the target device name.
    pub fn target(&self) -> &str {
        &self.target
    }

    fn clbit_width(&self, job_id: &str) -> usize {
        self.lock_widths().get(job_id).copied().unwrap_or(0)
    }

    /// Drop the width of a job whose counts have been delivered.
    fn forget_job(&self, job_id: &str) {
        self.lock_widths().remove(job_id);
    }

    fn lock_widths(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, usize>> {
        self.clbit_widths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Map an API status string to the HAL job state machine.
pub(crate) fn map_status(status: &JobStatusResponse) -> JobStatus {
    match status.status.to_uppercase().as_str() {
        "QUEUED" | "INITIALIZING" => JobStatus::Queued,
        "VALIDATING" | "RUNNING" => JobStatus::Running,
        "COMPLETED" => JobStatus::Completed,
        "FAILED" | "ERROR" => JobStatus::Failed(
            status
                .error_message()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
        "CANCELLED" => JobStatus::Cancelled,
        other => {
            debug!("unrecognized IBM job status '{}', treating as running", other);
            JobStatus::Running
        }
    }
}

/// Convert sampler results to counts with bitstrings `width` characters wide.
///
/// A `width` of zero infers the width from the largest sample.
pub(crate) fn results_to_counts(results: &JobResultResponse, width: usize) -> Counts {
    let mut counts = Counts::new();
    let Some(result) = results.results.first() else {
        return counts;
    };

    if let Some(data) = &result.data {
        for register in data.values() {
            let width = if width > 0 {
                width
            } else {
                infer_bit_width(&register.samples)
            };
            for sample in &register.samples {
                counts.insert(hex_to_binary(sample, width), 1);
            }
        }
    } else if let Some(raw) = &result.counts {
        for (outcome, &count) in raw {
            counts.insert(hex_to_binary(outcome, width), count);
        }
    }

    counts
}

/// Minimum bit width able to hold every sample; at least 1.
fn infer_bit_width(samples: &[String]) -> usize {
    let max_val = samples
        .iter()
        .filter_map(|s| u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok())
        .max()
        .unwrap_or(0);
    if max_val == 0 {
        1
    } else {
        64 - max_val.leading_zeros() as usize
    }
}

/// Convert a hex outcome to a binary string padded to `width`.
///
/// With `width` zero, each hex digit contributes four bits. Strings that
/// are not hex pass through unchanged.
fn hex_to_binary(hex: &str, width: usize) -> String {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    match u64::from_str_radix(digits, 16) {
        Ok(value) => {
            let width = if width > 0 { width } else { digits.len() * 4 };
            format!("{value:0width$b}")
        }
        Err(_) => digits.to_string(),
    }
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.target
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.client.get_backend(&self.target).await {
            Ok(info) if info.status.operational => Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.status.pending_jobs,
                estimated_wait: None,
                status_message: info.status.status_msg,
            }),
            Ok(info) => Ok(BackendAvailability::unavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "backend offline".to_string()),
            )),
            Err(e) => {
                warn!("IBM backend availability check failed: {e}");
                Ok(BackendAvailability::unavailable("failed to query backend"))
            }
        }
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let caps = self.capabilities();
        let mut reasons = Vec::new();

        if circuit.num_qubits() > caps.num_qubits as usize {
            reasons.push(format!(
                "Circuit requires {} qubits but backend only has {}",
                circuit.num_qubits(),
                caps.num_qubits
            ));
        }
        if let Some(gate) = circuit
            .instructions()
            .iter()
            .filter_map(|inst| inst.as_gate())
            .find(|g| !caps.gate_set.contains(g.name()))
        {
            reasons.push(format!("Unsupported gate: {}", gate.name()));
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(target = %self.target))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(IbmError::TooManyQubits {
                required: circuit.num_qubits(),
                available: self.capabilities.num_qubits as usize,
            }
            .into());
        }
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} is outside 1..={}",
                self.capabilities.max_shots
            )));
        }

        let source = qasm::emit(circuit);
        let response = self
            .client
            .submit_sampler_job(&self.target, vec![source], shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        debug!("Submitted IBM job {} ({} shots)", response.id, shots);
        self.lock_widths().insert(response.id.clone(), circuit.num_clbits());

        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.get_job_status(&job_id.0).await?;
        Ok(map_status(&status))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self.client.get_job_status(&job_id.0).await?;
        match map_status(&status) {
            JobStatus::Completed => {}
            JobStatus::Failed(msg) => return Err(IbmError::JobFailed(msg).into()),
            JobStatus::Cancelled => return Err(IbmError::JobCancelled(job_id.0.clone()).into()),
            JobStatus::Queued | JobStatus::Running => {
                return Err(HalError::Backend(format!(
                    "Job {} not yet completed",
                    job_id.0
                )));
            }
        }

        let results = self.client.get_job_results(&job_id.0).await?;
        let counts = results_to_counts(&results, self.clbit_width(&job_id.0));
        self.forget_job(&job_id.0);
        let total_shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);

        Ok(ExecutionResult::new(counts, total_shots)
            .with_metadata("backend", self.target.clone().into()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        Ok(())
    }

    /// Device queues can run for hours: poll every 5s for up to a day.
    fn poll_schedule(&self) -> (Duration, u32) {
        (Duration::from_secs(5), 17_280)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BackendStatus, ClassicalRegisterData, DEFAULT_ENDPOINT, SamplerResult};
    use qdimer_ir::QubitId;
    use std::collections::HashMap;

    fn status(s: &str) -> JobStatusResponse {
        serde_json::from_value(serde_json::json!({"id": "j", "status": s})).unwrap()
    }

    fn v2_results(samples: &[&str]) -> JobResultResponse {
        let mut data = HashMap::new();
        data.insert(
            "c".to_string(),
            ClassicalRegisterData {
                samples: samples.iter().map(|s| (*s).to_string()).collect(),
            },
        );
        JobResultResponse {
            results: vec![SamplerResult {
                data: Some(data),
                counts: None,
            }],
        }
    }

    #[test]
    fn test_hex_to_binary() {
        assert_eq!(hex_to_binary("0x0", 0), "0000");
        assert_eq!(hex_to_binary("0x3", 0), "0011");
        assert_eq!(hex_to_binary("0xff", 0), "11111111");
        assert_eq!(hex_to_binary("0x1", 2), "01");
        assert_eq!(hex_to_binary("0x2", 2), "10");
        assert_eq!(hex_to_binary("zz", 2), "zz");
    }

    #[test]
    fn test_infer_bit_width() {
        assert_eq!(infer_bit_width(&["0x0".into()]), 1);
        assert_eq!(infer_bit_width(&["0x1".into(), "0x3".into()]), 2);
        assert_eq!(infer_bit_width(&["0x4".into()]), 3);
    }

    #[test]
    fn test_results_to_counts_uses_register_width() {
        let results = v2_results(&["0x0", "0x0", "0x1", "0x0"]);
        let counts = results_to_counts(&results, 2);
        assert_eq!(counts.get("00"), 3);
        assert_eq!(counts.get("01"), 1);
        assert_eq!(counts.total_shots(), 4);
    }

    #[test]
    fn test_results_to_counts_infers_width() {
        let results = v2_results(&["0x0", "0x3", "0x3"]);
        let counts = results_to_counts(&results, 0);
        assert_eq!(counts.get("00"), 1);
        assert_eq!(counts.get("11"), 2);
    }

    #[test]
    fn test_results_to_counts_aggregated() {
        let mut raw = HashMap::new();
        raw.insert("0x0".to_string(), 500u64);
        raw.insert("0x2".to_string(), 300u64);
        let results = JobResultResponse {
            results: vec![SamplerResult {
                data: None,
                counts: Some(raw),
            }],
        };
        let counts = results_to_counts(&results, 2);
        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("10"), 300);
    }

    #[test]
    fn test_results_to_counts_empty() {
        let results = JobResultResponse { results: vec![] };
        assert!(results_to_counts(&results, 2).is_empty());
    }

    #[test]
    fn test_map_status() {
        assert_eq!(map_status(&status("Queued")), JobStatus::Queued);
        assert_eq!(map_status(&status("RUNNING")), JobStatus::Running);
        assert_eq!(map_status(&status("Completed")), JobStatus::Completed);
        assert_eq!(map_status(&status("Cancelled")), JobStatus::Cancelled);
        assert!(matches!(map_status(&status("ERROR")), JobStatus::Failed(_)));
        assert_eq!(map_status(&status("Warming")), JobStatus::Running);
    }

    #[test]
    fn test_from_info_caches_capabilities() {
        let client = Arc::new(IbmClient::new(DEFAULT_ENDPOINT, "token").unwrap());
        let info = BackendInfo {
            name: "ibm_kyiv".into(),
            num_qubits: 127,
            status: BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: Some(4),
            },
            simulator: false,
            max_shots: Some(8000),
        };
        let backend = IbmBackend::from_info(client, &info);
        assert_eq!(backend.name(), "ibm_kyiv");
        assert_eq!(backend.target(), "ibm_kyiv");
        assert_eq!(backend.capabilities().num_qubits, 127);
        assert_eq!(backend.capabilities().max_shots, 8000);
        assert!(!backend.capabilities().is_simulator);
    }

    #[test]
    fn test_register_width_dropped_after_delivery() {
        let client = Arc::new(IbmClient::new(DEFAULT_ENDPOINT, "token").unwrap());
        let backend = IbmBackend::from_parts(client, "dev".into(), Capabilities::ibm("dev", 2));
        backend.lock_widths().insert("job-1".into(), 2);
        backend.lock_widths().insert("job-2".into(), 2);

        assert_eq!(backend.clbit_width("job-1"), 2);
        backend.forget_job("job-1");
        assert_eq!(backend.clbit_width("job-1"), 0);
        assert_eq!(backend.lock_widths().len(), 1);
    }

    #[tokio::test]
    async fn test_validate_qubit_limit() {
        let client = Arc::new(IbmClient::new(DEFAULT_ENDPOINT, "token").unwrap());
        let backend = IbmBackend::from_parts(client, "tiny".into(), Capabilities::ibm("tiny", 1));

        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        assert!(!backend.validate(&circuit).await.unwrap().is_valid());
        assert!(matches!(
            backend.submit(&circuit, 10).await,
            Err(HalError::CircuitTooLarge(_))
        ));
    }
}

//! IBM Quantum Runtime REST client.
//!
//! Covers the calls the runner needs: device discovery with queue depth,
//! Sampler job submission, status polling, result retrieval and
//! cancellation. Authentication is a bearer token.

use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::{IbmError, IbmResult};

/// Runtime service root used when `BackendConfig::endpoint` is unset.
pub const DEFAULT_ENDPOINT: &str = "https://api.quantum-computing.ibm.com/runtime";

const USER_AGENT: &str = concat!("qdimer/", env!("CARGO_PKG_VERSION"));

/// Authenticated handle on the Runtime REST service.
pub struct IbmClient {
    client: Client,
    endpoint: String,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl IbmClient {
    /// Create a client that authenticates with `token`.
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        if token.trim().is_empty() {
            return Err(IbmError::MissingToken);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|_| IbmError::InvalidToken)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// List devices visible to this token.
    pub async fn list_backends(&self) -> IbmResult<Vec<BackendInfo>> {
        let url = format!("{}/backends", self.endpoint);
        let response = check(self.client.get(&url).send().await?).await?;
        let listing: BackendsResponse = response.json().await?;
        Ok(listing.backends)
    }

    /// Refresh one device, mainly for its current queue length.
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        let url = format!("{}/backends/{}", self.endpoint, name);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        let response = check(response).await?;
        response.json().await.map_err(IbmError::from)
    }

    /// Queue one shot batch per circuit on the Sampler primitive.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/jobs", self.endpoint);
        let body = sampler_request(backend, circuits, shots);
        let response = check(self.client.post(&url).json(&body).send().await?).await?;
        response.json().await.map_err(IbmError::from)
    }

    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/jobs/{}", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        let response = check(response).await?;
        response.json().await.map_err(IbmError::from)
    }

    /// Sampler output of a completed job.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/jobs/{}/results", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        let response = check(response).await?;
        response.json().await.map_err(IbmError::from)
    }

    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/jobs/{}/cancel", self.endpoint, job_id);
        check(self.client.post(&url).send().await?).await?;
        Ok(())
    }
}

/// Turn a non-success response into an [`IbmError::ApiError`].
async fn check(response: Response) -> IbmResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .filter(|e| !e.message.is_empty())
        .map_or(body, |e| e.message);
    Err(IbmError::ApiError {
        code: Some(status.as_u16().to_string()),
        message,
    })
}

/// Sampler V2 request body: one PUB `(circuit, params, shots)` per circuit.
fn sampler_request(backend: &str, circuits: Vec<String>, shots: u32) -> serde_json::Value {
    let pubs: Vec<serde_json::Value> = circuits
        .into_iter()
        .map(|c| serde_json::json!([c, {}, shots]))
        .collect();
    serde_json::json!({
        "program_id": "sampler",
        "backend": backend,
        "params": {
            "version": 2,
            "pubs": pubs,
            "options": { "optimization_level": 1 }
        }
    })
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct BackendsResponse {
    backends: Vec<BackendInfo>,
}

/// Device information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Device name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Device status.
    pub status: BackendStatus,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Maximum number of shots per job.
    #[serde(default)]
    pub max_shots: Option<u32>,
}

/// Device status.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the device is operational.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status, case varies between API revisions.
    pub status: String,
    /// Error information if failed.
    #[serde(default)]
    pub error: Option<JobError>,
    /// State object with failure reason.
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job error information.
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error message.
    pub message: String,
}

/// Job state with reason.
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Check if job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    /// Check if job failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    /// Check if job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Get the failure reason.
    pub fn error_message(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.clone())
            .or_else(|| self.error.as_ref().map(|e| e.message.clone()))
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// One entry per submitted circuit.
    pub results: Vec<SamplerResult>,
}

/// Sampler result for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// Classical register name to per-shot samples.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// Pre-aggregated counts keyed by hex outcome, from older Sampler versions.
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
}

/// Per-shot samples of one classical register.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    /// Hex-encoded outcomes, e.g. `["0x0", "0x3"]`.
    pub samples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_empty_token() {
        assert!(matches!(
            IbmClient::new(DEFAULT_ENDPOINT, "  "),
            Err(IbmError::MissingToken)
        ));
    }

    #[test]
    fn test_client_debug_redacts_token() {
        let client = IbmClient::new("https://example.com/runtime/", "secret").unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("\"https://example.com/runtime\""));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_sampler_request_shape() {
        let body = sampler_request("ibm_kyiv", vec!["OPENQASM 3.0;".into()], 8000);
        assert_eq!(body["program_id"], "sampler");
        assert_eq!(body["backend"], "ibm_kyiv");
        assert_eq!(body["params"]["version"], 2);
        assert_eq!(body["params"]["pubs"][0][2], 8000);
        assert!(body.get("hub").is_none());
    }

    #[test]
    fn test_backend_listing_deserialization() {
        let json = r#"{
            "backends": [
                {"name": "ibm_kyiv", "num_qubits": 127,
                 "status": {"operational": true, "pending_jobs": 42}},
                {"name": "ibm_sherbrooke", "num_qubits": 127, "max_shots": 100000,
                 "status": {"operational": false, "status_msg": "maintenance"}}
            ]
        }"#;
        let listing: BackendsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(listing.backends.len(), 2);
        assert_eq!(listing.backends[0].status.pending_jobs, Some(42));
        assert!(!listing.backends[1].status.operational);
        assert_eq!(listing.backends[1].max_shots, Some(100_000));
    }

    #[test]
    fn test_job_status_helpers() {
        let json = r#"{"id": "j1", "status": "Failed", "state": {"reason": "bad qasm"}}"#;
        let status: JobStatusResponse = serde_json::from_str(json).unwrap();
        assert!(status.is_failed());
        assert!(!status.is_completed());
        assert_eq!(status.error_message(), Some("bad qasm".to_string()));

        let json = r#"{"id": "j2", "status": "COMPLETED"}"#;
        let status: JobStatusResponse = serde_json::from_str(json).unwrap();
        assert!(status.is_completed());
        assert!(status.error_message().is_none());
    }

    #[test]
    fn test_v2_results_deserialization() {
        let json = r#"{"results": [{"data": {"c": {"samples": ["0x0", "0x3"]}}}]}"#;
        let results: JobResultResponse = serde_json::from_str(json).unwrap();
        let data = results.results[0].data.as_ref().unwrap();
        assert_eq!(data["c"].samples.len(), 2);
    }
}

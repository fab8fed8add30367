//! qdimer Hardware Abstraction Layer
//!
//! A common interface over the local simulator and remote devices:
//! - the [`Backend`] trait for job submission and polling
//! - [`Capabilities`] describing gate set and shot limits
//! - [`BackendRegistry`] for name lookup and least-busy selection
//! - [`TokenProvider`] implementations for remote credentials
//! - [`ExecutionResult`] and [`Counts`] for measurement results
//!
//! # Example
//!
//! ```ignore
//! use qdimer_hal::Backend;
//! use qdimer_adapter_sim::SimulatorBackend;
//!
//! let backend = SimulatorBackend::new();
//! let job_id = backend.submit(&circuit, 1000).await?;
//! let result = backend.wait(&job_id).await?;
//! println!("{:?}", result.counts.most_frequent());
//! ```

pub mod auth;
pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;

pub use auth::{ChainTokenProvider, EnvTokenProvider, FileTokenProvider, TokenProvider};
pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, DEFAULT_MAX_SHOTS, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use registry::{BackendRegistry, LEAST_BUSY};
pub use result::{Counts, ExecutionResult};

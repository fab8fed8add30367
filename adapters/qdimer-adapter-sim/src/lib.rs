//! qdimer Local Statevector Simulator
//!
//! Exact statevector evolution with shot sampling, intended for the
//! two-qubit circuits the runner builds. Sampling uses a seedable RNG so
//! runs can be reproduced.
//!
//! # Example
//!
//! ```ignore
//! use qdimer_adapter_sim::SimulatorBackend;
//! use qdimer_hal::Backend;
//!
//! let backend = SimulatorBackend::with_seed(7);
//! let job_id = backend.submit(&circuit, 1000).await?;
//! let result = backend.wait(&job_id).await?;
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
pub use statevector::Statevector;

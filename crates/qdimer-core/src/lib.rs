//! qdimer core
//!
//! Turns per-slice tunneling, bias and coupling constants of a two-site
//! dimer into a two-qubit Trotter circuit, runs it for a chosen number of
//! shots on any [`qdimer_hal::Backend`], and appends the outcome histograms
//! to a CSV log.
//!
//! ```text
//!   PhysicalParameterSet ──derive_weights──→ WeightMatrix
//!                                               │
//!   StateVariant ───────generate_circuit────────┘──→ Circuit
//!                                                      │
//!   Backend ◀──────────CircuitRunner::run──────────────┘──→ OutcomeHistogram
//! ```
//!
//! # Example
//!
//! ```ignore
//! use qdimer_core::{Experiment, RunConfig, CsvLog};
//! use qdimer_adapter_sim::SimulatorBackend;
//!
//! let config = RunConfig::default();
//! let experiment = Experiment::from_config(&config)?;
//! let mut log = CsvLog::open(&config.output.filename, config.bit_order)?;
//! let backend = SimulatorBackend::with_seed(7);
//! experiment.run(&backend, &mut log, |record| println!("{record:?}")).await?;
//! ```

pub mod circuit;
pub mod config;
pub mod error;
pub mod experiment;
pub mod histogram;
pub mod params;
pub mod record;
pub mod runner;
pub mod state;
pub mod weights;

pub use circuit::generate_circuit;
pub use config::{ConfigError, OutputConfig, RunConfig, SweepConfig};
pub use error::{CoreError, CoreResult};
pub use experiment::Experiment;
pub use histogram::{BitOrder, OutcomeHistogram};
pub use params::PhysicalParameterSet;
pub use record::{CsvLog, RunRecord};
pub use runner::{CircuitRunner, MAX_SHOTS_PER_CALL, batch_sizes};
pub use state::StateVariant;
pub use weights::{EvolutionConfig, NormVariant, WeightMatrix, derive_weights};

//! A full sweep: every state at every epoch, recorded as it completes.

use qdimer_hal::Backend;
use qdimer_ir::Circuit;
use tracing::info;

use crate::circuit::generate_circuit;
use crate::config::RunConfig;
use crate::error::CoreResult;
use crate::params::PhysicalParameterSet;
use crate::record::{CsvLog, RunRecord};
use crate::runner::CircuitRunner;
use crate::state::StateVariant;
use crate::weights::{WeightMatrix, derive_weights};

/// Circuits and shot plan for one invocation.
#[derive(Debug, Clone)]
pub struct Experiment {
    circuits: Vec<(StateVariant, Circuit)>,
    weights: WeightMatrix,
    shot_plan: Vec<u64>,
    noise: bool,
    decoherence: bool,
    runner: CircuitRunner,
}

impl Experiment {
    /// Derive weights and build one circuit per state from `config`.
    pub fn from_config(config: &RunConfig) -> CoreResult<Self> {
        config.validate()?;
        let params = PhysicalParameterSet::select(config.noise, config.decoherence);
        let weights = derive_weights(&params, &config.evolution, config.norm_variant)?;

        let circuits = StateVariant::ALL
            .into_iter()
            .map(|state| {
                generate_circuit(state, &weights, config.setup_only).map(|circuit| (state, circuit))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            circuits,
            weights,
            shot_plan: config.sweep.shot_plan()?,
            noise: config.noise,
            decoherence: config.decoherence,
            runner: CircuitRunner::new().with_max_shots_per_call(config.max_shots_per_call),
        })
    }

    /// The derived weight matrix.
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Circuits in run order.
    pub fn circuits(&self) -> &[(StateVariant, Circuit)] {
        &self.circuits
    }

    /// Shots per epoch.
    pub fn shot_plan(&self) -> &[u64] {
        &self.shot_plan
    }

    /// Number of rows a complete run appends.
    pub fn total_runs(&self) -> usize {
        self.shot_plan.len() * self.circuits.len()
    }

    /// Run every epoch on `backend`, appending each record to `log`.
    ///
    /// `on_record` sees each record right after it is written.
    pub async fn run(
        &self,
        backend: &dyn Backend,
        log: &mut CsvLog,
        mut on_record: impl FnMut(&RunRecord),
    ) -> CoreResult<Vec<RunRecord>> {
        let mut records = Vec::with_capacity(self.total_runs());

        for (epoch, &shots) in self.shot_plan.iter().enumerate() {
            info!(epoch = epoch + 1, shots, backend = backend.name(), "epoch");
            for (state, circuit) in &self.circuits {
                let histogram = self.runner.run(backend, circuit, shots).await?;
                let record = RunRecord {
                    backend: backend.name().to_string(),
                    noise: self.noise,
                    decoherence: self.decoherence,
                    shots,
                    state: *state,
                    histogram,
                };
                log.append(&record)?;
                on_record(&record);
                records.push(record);
            }
        }

        Ok(records)
    }
}

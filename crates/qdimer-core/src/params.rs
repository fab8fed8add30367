//! Physical parameter sets for the tunneling dimer.
//!
//! Each set holds per-time-slice tunneling amplitudes and bias energies for
//! both sites plus the inter-site coupling. Index `i` of every sequence is
//! time slice `i`.

use serde::{Deserialize, Serialize};

/// Number of time slices in the literal parameter sets.
pub const TIME_CHUNKS: usize = 4;

const BASELINE_TUNNELING: [f64; TIME_CHUNKS] = [2.4886, 2.4730, 2.4852, 2.4949];
const BASELINE_BIAS: [f64; TIME_CHUNKS] = [0.092889, 0.11577, 0.095443, 0.083292];
const BASELINE_COUPLING: [f64; TIME_CHUNKS] = [0.03820, 0.12759, 0.11692, 0.038180];

const NOISE_TUNNELING_A: [f64; TIME_CHUNKS] = [2.4901, 2.4712, 2.4869, 2.4933];
const NOISE_TUNNELING_B: [f64; TIME_CHUNKS] = [2.4874, 2.4751, 2.4838, 2.4962];
const NOISE_BIAS_A: [f64; TIME_CHUNKS] = [0.093512, 0.11491, 0.096127, 0.082740];
const NOISE_BIAS_B: [f64; TIME_CHUNKS] = [0.092301, 0.11652, 0.094871, 0.083855];

const DECOHERENCE_COUPLING: [f64; TIME_CHUNKS] = [0.03437, 0.11483, 0.10523, 0.034362];

/// Tunneling, bias and coupling sequences for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameterSet {
    /// Tunneling amplitude of site A per slice.
    pub tunneling_a: Vec<f64>,
    /// Tunneling amplitude of site B per slice.
    pub tunneling_b: Vec<f64>,
    /// Bias energy of site A per slice.
    pub bias_a: Vec<f64>,
    /// Bias energy of site B per slice.
    pub bias_b: Vec<f64>,
    /// Inter-site coupling per slice.
    pub coupling: Vec<f64>,
}

impl PhysicalParameterSet {
    /// Identical, noiseless sites.
    pub fn baseline() -> Self {
        Self {
            tunneling_a: BASELINE_TUNNELING.to_vec(),
            tunneling_b: BASELINE_TUNNELING.to_vec(),
            bias_a: BASELINE_BIAS.to_vec(),
            bias_b: BASELINE_BIAS.to_vec(),
            coupling: BASELINE_COUPLING.to_vec(),
        }
    }

    /// Sites with independently perturbed tunneling and bias.
    pub fn noise() -> Self {
        Self {
            tunneling_a: NOISE_TUNNELING_A.to_vec(),
            tunneling_b: NOISE_TUNNELING_B.to_vec(),
            bias_a: NOISE_BIAS_A.to_vec(),
            bias_b: NOISE_BIAS_B.to_vec(),
            coupling: BASELINE_COUPLING.to_vec(),
        }
    }

    /// Baseline sites with a damped coupling.
    pub fn decoherence() -> Self {
        Self {
            coupling: DECOHERENCE_COUPLING.to_vec(),
            ..Self::baseline()
        }
    }

    /// Perturbed sites with a damped coupling.
    pub fn noise_decoherence() -> Self {
        Self {
            coupling: DECOHERENCE_COUPLING.to_vec(),
            ..Self::noise()
        }
    }

    /// Pick the literal set matching the run flags.
    pub fn select(noise: bool, decoherence: bool) -> Self {
        match (noise, decoherence) {
            (false, false) => Self::baseline(),
            (true, false) => Self::noise(),
            (false, true) => Self::decoherence(),
            (true, true) => Self::noise_decoherence(),
        }
    }

    /// True when the two sites share their bias in every slice.
    pub fn has_symmetric_bias(&self) -> bool {
        self.bias_a == self.bias_b
    }
}

impl Default for PhysicalParameterSet {
    fn default() -> Self {
        Self::baseline()
    }
}

//! Static device limits.
//!
//! The runner sizes its shot batches from [`Capabilities::max_shots`];
//! `validate()` implementations check qubit count and gate names against
//! the rest.

use serde::{Deserialize, Serialize};

/// Shot ceiling when a device does not report one.
pub const DEFAULT_MAX_SHOTS: u32 = 100_000;

/// What a device can run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub name: String,
    pub num_qubits: u32,
    /// Gate names accepted on submission, in OpenQASM 3 spelling.
    pub gate_set: GateSet,
    /// Most shots a single job may request.
    pub max_shots: u32,
    pub is_simulator: bool,
}

impl Capabilities {
    /// The local statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            max_shots: DEFAULT_MAX_SHOTS,
            is_simulator: true,
        }
    }

    /// A remote IBM Quantum device.
    ///
    /// The Sampler service transpiles OpenQASM 3 server-side, so the gate
    /// set lists what may be submitted rather than what runs natively.
    pub fn ibm(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::ibm(),
            max_shots: DEFAULT_MAX_SHOTS,
            is_simulator: false,
        }
    }

    pub fn with_max_shots(mut self, max_shots: u32) -> Self {
        self.max_shots = max_shots;
        self
    }
}

/// Accepted gate names, split by arity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    pub single_qubit: Vec<String>,
    pub two_qubit: Vec<String>,
}

impl GateSet {
    /// Every gate the circuit IR can express.
    pub fn universal() -> Self {
        Self::from_names(
            &["id", "x", "y", "z", "h", "s", "sdg", "rx", "ry", "rz"],
            &["cx", "cz", "swap"],
        )
    }

    /// Stdgates accepted by the IBM Sampler, plus `sx` and `ecr`.
    pub fn ibm() -> Self {
        Self::from_names(
            &["id", "x", "y", "z", "h", "s", "sdg", "sx", "rx", "ry", "rz"],
            &["cx", "cz", "ecr", "swap"],
        )
    }

    fn from_names(single: &[&str], two: &[&str]) -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| (*n).to_string()).collect();
        Self {
            single_qubit: owned(single),
            two_qubit: owned(two),
        }
    }

    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit
            .iter()
            .chain(&self.two_qubit)
            .any(|g| g == gate)
    }
}

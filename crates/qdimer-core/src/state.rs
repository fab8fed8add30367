//! Initial two-qubit states.

use std::fmt;
use std::str::FromStr;

use qdimer_ir::{Circuit, IrResult, QubitId};
use serde::{Deserialize, Serialize};

const Q0: QubitId = QubitId(0);
const Q1: QubitId = QubitId(1);

/// Rotation angles of the P preparation.
pub const P_PARAMETERS: [f64; 3] = [4.511031, 2.300524, 5.355890];

/// Initial state the evolution starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateVariant {
    /// `(|00⟩ + |11⟩)/√2`.
    Bell,
    /// Uniform superposition over all four basis states.
    Flat,
    /// `|1⟩ ⊗ (|0⟩ + 2|1⟩)/√5` with qubit 0 flipped.
    C,
    /// Partially entangled state reached by three Y rotations.
    P,
}

impl StateVariant {
    /// All variants in run order.
    pub const ALL: [StateVariant; 4] = [
        StateVariant::Bell,
        StateVariant::Flat,
        StateVariant::C,
        StateVariant::P,
    ];

    /// Label used in logs and the results file.
    pub fn name(&self) -> &'static str {
        match self {
            StateVariant::Bell => "Bell",
            StateVariant::Flat => "Flat",
            StateVariant::C => "C",
            StateVariant::P => "P",
        }
    }

    /// Expected entanglement of the prepared state before evolution.
    pub fn target_entanglement(&self) -> f64 {
        match self {
            StateVariant::Bell => 1.0,
            StateVariant::Flat | StateVariant::C => 0.0,
            StateVariant::P => 0.663325,
        }
    }

    /// Append the preparation gates for this state to `circuit`.
    ///
    /// The circuit must have at least two qubits.
    pub fn prepare(&self, circuit: &mut Circuit) -> IrResult<()> {
        match self {
            StateVariant::Bell => {
                circuit.h(Q0)?.cx(Q0, Q1)?;
            }
            StateVariant::Flat => {
                circuit.h(Q0)?.h(Q1)?;
            }
            StateVariant::C => {
                let theta = 2.0 * (1.0 / 5.0_f64.sqrt()).acos();
                circuit.x(Q0)?.ry(theta, Q1)?;
            }
            StateVariant::P => {
                let [p0, p1, p2] = P_PARAMETERS;
                circuit
                    .ry(-p0, Q1)?
                    .swap(Q0, Q1)?
                    .ry(p1, Q1)?
                    .swap(Q0, Q1)?
                    .ry(p2, Q1)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for StateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StateVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bell" => Ok(StateVariant::Bell),
            "flat" => Ok(StateVariant::Flat),
            "c" => Ok(StateVariant::C),
            "p" => Ok(StateVariant::P),
            other => Err(format!("unknown state '{other}'")),
        }
    }
}

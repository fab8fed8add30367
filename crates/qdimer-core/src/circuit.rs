//! Full dimer circuits: preparation, time evolution, measurement.

use qdimer_ir::{Circuit, QubitId};
use tracing::debug;

use crate::error::CoreResult;
use crate::state::StateVariant;
use crate::weights::{WeightMatrix, WeightRow};

const Q0: QubitId = QubitId(0);
const Q1: QubitId = QubitId(1);

/// Build the measured two-qubit circuit for one initial state.
///
/// With `setup_only` the time-evolution slices are left out and the circuit
/// measures the prepared state directly.
pub fn generate_circuit(
    variant: StateVariant,
    weights: &WeightMatrix,
    setup_only: bool,
) -> CoreResult<Circuit> {
    let mut circuit = Circuit::with_size(format!("dimer_{}", variant.name().to_lowercase()), 2, 2);
    variant.prepare(&mut circuit)?;

    if !setup_only {
        for row in weights.iter() {
            evolve_slice(&mut circuit, row)?;
        }
    }

    circuit.measure_all()?;
    debug!(
        state = %variant,
        setup_only,
        ops = circuit.num_ops(),
        depth = circuit.depth(),
        "generated circuit"
    );
    Ok(circuit)
}

/// One Trotter slice: ZZ coupling, then each site rotated into its own
/// tunneling axis, phase-evolved and rotated back.
fn evolve_slice(circuit: &mut Circuit, row: &WeightRow) -> CoreResult<()> {
    let [coupling, angle_a, angle_b, phase_a, phase_b] = *row;
    circuit
        .cx(Q0, Q1)?
        .rz(coupling, Q1)?
        .cx(Q0, Q1)?
        .ry(-angle_a, Q0)?
        .ry(-angle_b, Q1)?
        .rz(phase_a, Q0)?
        .rz(phase_b, Q1)?
        .ry(angle_a, Q0)?
        .ry(angle_b, Q1)?;
    Ok(())
}

//! OpenQASM 3 serialization for remote submission.

use std::fmt::Write as _;

use crate::circuit::Circuit;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::QubitId;

/// Emit a circuit as OpenQASM 3 source.
///
/// Angles are written with full round-trip precision so the remote device
/// executes exactly the rotations the local simulator would.
pub fn emit(circuit: &Circuit) -> String {
    let mut out = String::new();
    out.push_str("OPENQASM 3.0;\n");
    out.push_str("include \"stdgates.inc\";\n\n");

    let num_qubits = circuit.num_qubits();
    if num_qubits > 0 {
        let _ = writeln!(out, "qubit[{num_qubits}] q;");
    }
    let num_clbits = circuit.num_clbits();
    if num_clbits > 0 {
        let _ = writeln!(out, "bit[{num_clbits}] c;");
    }
    if num_qubits > 0 || num_clbits > 0 {
        out.push('\n');
    }

    for instruction in circuit.instructions() {
        emit_instruction(&mut out, instruction);
    }
    out
}

fn emit_instruction(out: &mut String, instruction: &Instruction) {
    let qubits = join_qubits(&instruction.qubits);
    match &instruction.kind {
        InstructionKind::Gate(gate) => match gate.angle() {
            Some(theta) => {
                let _ = writeln!(out, "{}({theta}) {qubits};", gate.name());
            }
            None => {
                let _ = writeln!(out, "{} {qubits};", gate.name());
            }
        },
        InstructionKind::Measure => {
            for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                let _ = writeln!(out, "c[{}] = measure q[{}];", c.0, q.0);
            }
        }
        InstructionKind::Barrier => {
            if qubits.is_empty() {
                out.push_str("barrier;\n");
            } else {
                let _ = writeln!(out, "barrier {qubits};");
            }
        }
    }
}

fn join_qubits(qubits: &[QubitId]) -> String {
    qubits
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

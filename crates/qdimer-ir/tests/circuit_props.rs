use proptest::prelude::*;
use qdimer_ir::{Circuit, QubitId, qasm};

fn rotation_layer() -> impl Strategy<Value = Vec<(u8, f64)>> {
    prop::collection::vec((0u8..3, -10.0f64..10.0), 0..32)
}

proptest! {
    #[test]
    fn depth_never_exceeds_op_count(layer in rotation_layer()) {
        let mut circuit = Circuit::with_size("props", 2, 2);
        for (kind, theta) in &layer {
            match kind {
                0 => { circuit.ry(*theta, QubitId(0)).unwrap(); }
                1 => { circuit.rz(*theta, QubitId(1)).unwrap(); }
                _ => { circuit.cx(QubitId(0), QubitId(1)).unwrap(); }
            }
        }
        circuit.measure_all().unwrap();
        prop_assert!(circuit.depth() <= circuit.num_ops());
        prop_assert_eq!(circuit.num_ops(), layer.len() + 2);
    }

    #[test]
    fn qasm_has_one_line_per_instruction(layer in rotation_layer()) {
        let mut circuit = Circuit::with_size("props", 2, 0);
        for (_, theta) in &layer {
            circuit.rx(*theta, QubitId(0)).unwrap();
        }
        let qasm = qasm::emit(&circuit);
        let gate_lines = qasm.lines().filter(|l| l.starts_with("rx(")).count();
        prop_assert_eq!(gate_lines, layer.len());
    }
}

#[test]
fn serde_roundtrip_preserves_instructions() {
    let mut circuit = Circuit::with_size("json", 2, 2);
    circuit.h(QubitId(0)).unwrap();
    circuit.swap(QubitId(0), QubitId(1)).unwrap();
    let json = serde_json::to_string(&circuit).unwrap();
    let back: Circuit = serde_json::from_str(&json).unwrap();
    assert_eq!(back, circuit);
}

//! Integration tests for primitive gates and the basic pass contract.
//!
//! These tests verify:
//! - Exhaustive truth tables of every gate kind for 1 to 4 inputs
//! - Fan-out broadcast
//! - Idempotent evaluation within a pass and full reset by unevaluate

use gatework::{BlockId, Circuit, GateKind, Level};

// ============================================================================
// Helpers
// ============================================================================

fn levels(width: usize, bits: u32) -> Vec<Level> {
    (0..width)
        .map(|i| Level::from((bits >> i) & 1 == 1))
        .collect()
}

fn expected(kind: GateKind, inputs: &[Level]) -> Level {
    let all = inputs.iter().all(|l| l.is_one());
    let any = inputs.iter().any(|l| l.is_one());
    Level::from(match kind {
        GateKind::And => all,
        GateKind::Or => any,
        GateKind::Nand => !all,
        GateKind::Nor => !any,
        GateKind::Not => !inputs[0].is_one(),
    })
}

fn run_pass(circuit: &mut Circuit, gate: BlockId, inputs: &[Level]) -> Level {
    circuit.set_inputs(gate, inputs);
    circuit.evaluate(gate);
    circuit.unevaluate(gate);
    circuit.output_level(gate, "1").unwrap()
}

// ============================================================================
// Truth tables
// ============================================================================

#[test]
fn test_multi_input_gate_truth_tables() {
    for kind in [GateKind::And, GateKind::Or, GateKind::Nand, GateKind::Nor] {
        for width in 1..=4 {
            let mut circuit = Circuit::new();
            let gate = circuit.add_gate(kind, width).unwrap();

            for bits in 0..(1u32 << width) {
                let inputs = levels(width, bits);
                assert_eq!(
                    run_pass(&mut circuit, gate, &inputs),
                    expected(kind, &inputs),
                    "{kind} with inputs {inputs:?}"
                );
            }
        }
    }
}

#[test]
fn test_not_is_complement() {
    let mut circuit = Circuit::new();
    let not = circuit.add_gate(GateKind::Not, 1).unwrap();

    assert_eq!(run_pass(&mut circuit, not, &[Level::Zero]), Level::One);
    assert_eq!(run_pass(&mut circuit, not, &[Level::One]), Level::Zero);
    assert_eq!(run_pass(&mut circuit, not, &[Level::Zero]), Level::One);
}

#[test]
fn test_unset_inputs_default_to_zero() {
    let mut circuit = Circuit::new();
    let nor = circuit.add_gate(GateKind::Nor, 3).unwrap();
    circuit.step(nor);
    assert_eq!(circuit.output_level(nor, "1").unwrap(), Level::One);
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn test_fan_out_broadcast() {
    let mut circuit = Circuit::new();
    let source = circuit.add_gate(GateKind::Or, 1).unwrap();
    let sinks: Vec<_> = (0..5)
        .map(|_| circuit.add_gate(GateKind::Not, 1).unwrap())
        .collect();

    let out = circuit.output(source, "1").unwrap();
    let inputs: Vec<_> = sinks
        .iter()
        .map(|&sink| circuit.input(sink, "1").unwrap())
        .collect();
    inputs
        .iter()
        .fold(circuit.wire(out), |wire, &input| wire.to(input));
    assert_eq!(circuit.fan_out(out), inputs.as_slice());

    for level in [Level::One, Level::Zero] {
        circuit.set_input(source, "1", level).unwrap();
        circuit.step(source);
        for (&sink, &input) in sinks.iter().zip(&inputs) {
            assert_eq!(circuit.level(input), level);
            assert_eq!(circuit.output_level(sink, "1").unwrap(), !level);
        }
    }
}

#[test]
fn test_chain_propagates_in_one_pass() {
    let mut circuit = Circuit::new();
    let first = circuit.add_gate(GateKind::And, 2).unwrap();
    let second = circuit.add_gate(GateKind::Not, 1).unwrap();
    let third = circuit.add_gate(GateKind::Or, 2).unwrap();

    let (o1, i2) = (circuit.output(first, "1").unwrap(), circuit.input(second, "1").unwrap());
    let (o2, i3) = (circuit.output(second, "1").unwrap(), circuit.input(third, "1").unwrap());
    circuit.connect(o1, i2);
    circuit.connect(o2, i3);

    circuit.set_inputs(first, &[Level::One, Level::One]);
    circuit.step(first);
    assert_eq!(circuit.output_level(second, "1").unwrap(), Level::Zero);
    assert_eq!(circuit.output_level(third, "1").unwrap(), Level::Zero);

    circuit.set_input(first, "2", Level::Zero).unwrap();
    circuit.step(first);
    assert_eq!(circuit.output_level(third, "1").unwrap(), Level::One);
}

// ============================================================================
// Pass contract
// ============================================================================

#[test]
fn test_evaluate_idempotent_without_unevaluate() {
    let mut circuit = Circuit::new();
    let and = circuit.add_gate(GateKind::And, 2).unwrap();
    let not = circuit.add_gate(GateKind::Not, 1).unwrap();
    let (out, inp) = (circuit.output(and, "1").unwrap(), circuit.input(not, "1").unwrap());
    circuit.connect(out, inp);

    circuit.set_inputs(and, &[Level::One, Level::One]);
    circuit.evaluate(and);
    let first = circuit.output_levels(not);

    // A second evaluate in the same pass is a no-op, even after inputs change.
    circuit.set_inputs(and, &[Level::Zero, Level::Zero]);
    circuit.evaluate(and);
    assert_eq!(circuit.output_levels(not), first);
    assert_eq!(circuit.output_level(and, "1").unwrap(), Level::One);

    circuit.unevaluate(and);
    circuit.evaluate(and);
    assert_eq!(circuit.output_level(not, "1").unwrap(), Level::One);
}

#[test]
fn test_unevaluate_resets_every_block() {
    let mut circuit = Circuit::new();
    let gates: Vec<_> = (0..3)
        .map(|_| circuit.add_gate(GateKind::Nand, 2).unwrap())
        .collect();
    // Ring with a back edge: 0 -> 1 -> 2 -> 0
    for i in 0..3 {
        let out = circuit.output(gates[i], "1").unwrap();
        let inp = circuit.input(gates[(i + 1) % 3], "2").unwrap();
        circuit.connect(out, inp);
    }

    circuit.evaluate(gates[0]);
    assert!(gates.iter().all(|&g| circuit.is_evaluated(g)));

    circuit.unevaluate(gates[0]);
    assert!(circuit.blocks().all(|(_, b)| !b.is_evaluated()));
}

#[test]
fn test_stale_flags_freeze_simulation() {
    let mut circuit = Circuit::new();
    let not = circuit.add_gate(GateKind::Not, 1).unwrap();

    circuit.evaluate(not);
    circuit.set_input(not, "1", Level::One).unwrap();
    circuit.evaluate(not);
    assert_eq!(circuit.output_level(not, "1").unwrap(), Level::One);
    assert_eq!(circuit.stats().gate_evaluations, 1);
}

//! Integration tests for feedback circuits.
//!
//! These tests verify:
//! - The RS latch from the factory through set, hold, reset and hold
//! - Latch transitions that need more than one pass
//! - A hand-wired NOR latch with numbered ports
//! - Termination and settling behavior of feedback loops

use gatework::{factory, BlockId, Circuit, CircuitError, GateKind, Level};

fn drive(circuit: &mut Circuit, latch: BlockId, s: Level, r: Level) -> (Level, Level) {
    circuit.set_input(latch, "S", s).unwrap();
    circuit.set_input(latch, "R", r).unwrap();
    circuit.step(latch);
    outputs(circuit, latch)
}

fn outputs(circuit: &Circuit, latch: BlockId) -> (Level, Level) {
    (
        circuit.output_level(latch, "Q").unwrap(),
        circuit.output_level(latch, "~Q").unwrap(),
    )
}

#[test]
fn test_rs_latch_set_hold_reset_hold() {
    use Level::{One, Zero};

    let mut circuit = Circuit::new();
    let latch = factory::rs_flip_flop(&mut circuit).unwrap();

    assert_eq!(drive(&mut circuit, latch, One, Zero), (One, Zero));
    assert_eq!(drive(&mut circuit, latch, Zero, Zero), (One, Zero));
    assert_eq!(drive(&mut circuit, latch, Zero, One), (Zero, One));
    assert_eq!(drive(&mut circuit, latch, Zero, Zero), (Zero, One));

    // Once more around the cycle. Set from the reset state takes two passes.
    assert_eq!(drive(&mut circuit, latch, One, Zero), (Zero, Zero));
    circuit.step(latch);
    assert_eq!(outputs(&circuit, latch), (One, Zero));
    assert_eq!(drive(&mut circuit, latch, Zero, Zero), (One, Zero));
    assert_eq!(circuit.stats().passes, 7);
}

#[test]
fn test_rs_latch_set_after_reset_settles_in_two_passes() {
    use Level::{One, Zero};

    let mut circuit = Circuit::new();
    let latch = factory::rs_flip_flop(&mut circuit).unwrap();
    assert_eq!(drive(&mut circuit, latch, Zero, One), (Zero, One));

    circuit.set_input(latch, "S", One).unwrap();
    circuit.set_input(latch, "R", Zero).unwrap();
    // Two passes that change something, then a quiet one.
    assert_eq!(circuit.settle(latch, 8).unwrap(), 3);
    assert_eq!(outputs(&circuit, latch), (One, Zero));

    // Driving the same transition one pass at a time shows the intermediate.
    assert_eq!(drive(&mut circuit, latch, Zero, One), (Zero, One));
    assert_eq!(drive(&mut circuit, latch, One, Zero), (Zero, Zero));
    assert_eq!(circuit.settle(latch, 8).unwrap(), 2);
    assert_eq!(outputs(&circuit, latch), (One, Zero));
}

#[test]
fn test_rs_latch_transitions_are_already_settled() {
    let mut circuit = Circuit::new();
    let latch = factory::rs_flip_flop(&mut circuit).unwrap();

    for (s, r) in [(true, false), (false, false), (false, true), (false, false)] {
        circuit.set_input(latch, "S", s).unwrap();
        circuit.set_input(latch, "R", r).unwrap();
        circuit.step(latch);
        // A second pass changes nothing.
        assert_eq!(circuit.settle(latch, 4).unwrap(), 1, "S={s} R={r}");
    }
}

/// Two NOR gates wired by hand inside a compound with numbered ports:
/// input 1 feeds the first gate, input 2 the second, output 1 follows the
/// second gate.
fn numbered_latch(circuit: &mut Circuit) -> BlockId {
    let latch = circuit.add_compound("RS-Flipflop", 2, 1).unwrap();
    let nor1 = circuit.add_gate(GateKind::Nor, 2).unwrap();
    let nor2 = circuit.add_gate(GateKind::Nor, 2).unwrap();

    let out1 = circuit.output(nor1, "1").unwrap();
    let out2 = circuit.output(nor2, "1").unwrap();
    let nor1_in = [circuit.input(nor1, "1").unwrap(), circuit.input(nor1, "2").unwrap()];
    let nor2_in = [circuit.input(nor2, "1").unwrap(), circuit.input(nor2, "2").unwrap()];
    let sink = circuit.internal_output(latch, "1").unwrap();
    let src1 = circuit.internal_input(latch, "1").unwrap();
    let src2 = circuit.internal_input(latch, "2").unwrap();

    circuit.connect(out1, nor2_in[0]);
    circuit.connect(out2, nor1_in[1]).to(sink);
    circuit.connect(src1, nor1_in[0]);
    circuit.connect(src2, nor2_in[1]);
    latch
}

#[test]
fn test_numbered_latch_sequence() {
    use Level::{One, Zero};

    let mut circuit = Circuit::new();
    let latch = numbered_latch(&mut circuit);

    let sequence = [
        ((Zero, Zero), Zero),
        ((One, Zero), One),
        ((One, Zero), One),
        ((Zero, Zero), One),
        ((Zero, One), Zero),
        ((Zero, Zero), Zero),
    ];
    for ((in1, in2), expected) in sequence {
        circuit.set_inputs(latch, &[in1, in2]);
        circuit.step(latch);
        assert_eq!(
            circuit.output_level(latch, "1").unwrap(),
            expected,
            "inputs {in1}{in2}"
        );
    }
}

#[test]
fn test_each_gate_evaluates_once_per_pass() {
    let mut circuit = Circuit::new();
    let latch = factory::rs_flip_flop(&mut circuit).unwrap();
    circuit.set_input(latch, "S", Level::One).unwrap();
    circuit.step(latch);

    let stats = circuit.stats();
    assert_eq!(stats.gate_evaluations, 2);
    assert_eq!(stats.compound_evaluations, 1);
    assert!(stats.guard_hits > 0);
}

#[test]
fn test_ring_oscillator_never_settles() {
    let mut circuit = Circuit::new();
    let gates: Vec<_> = (0..3)
        .map(|_| circuit.add_gate(GateKind::Not, 1).unwrap())
        .collect();
    for i in 0..3 {
        let out = circuit.output(gates[i], "1").unwrap();
        let inp = circuit.input(gates[(i + 1) % 3], "1").unwrap();
        circuit.connect(out, inp);
    }

    // Every pass still terminates.
    circuit.step(gates[0]);
    assert!(circuit.blocks().all(|(_, b)| !b.is_evaluated()));

    assert!(matches!(
        circuit.settle(gates[0], 10),
        Err(CircuitError::Unsettled { passes: 10, .. })
    ));
}

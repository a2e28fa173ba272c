//! Ready-made compound circuits.
//!
//! Each helper adds a compound block and its gates to a circuit, wires them
//! up and returns the compound's handle. Ids are generated from the
//! circuit's allocator.

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};
use crate::gate::GateKind;
use crate::signal::OutputRef;
use crate::truth_table::MAX_TABLE_INPUTS;
use crate::types::{BlockId, Level};

/// Builds an RS latch from two cross-coupled NOR gates.
///
/// Ports: inputs `R`, `S`; outputs `Q`, `~Q`. Id prefix `RS-FF`.
///
/// | S | R | Q          |
/// |---|---|------------|
/// | 0 | 0 | hold       |
/// | 1 | 0 | 1          |
/// | 0 | 1 | 0          |
/// | 1 | 1 | both low   |
///
/// The `R` side gate is evaluated first in every pass. Reset, hold and a set
/// from the cold or hold state are stable after one pass. A set issued from
/// the reset state is not: the first pass leaves both outputs low and only
/// the second drives `Q` high. Use [`Circuit::settle`] when the previous
/// state is unknown.
pub fn rs_flip_flop(circuit: &mut Circuit) -> CircuitResult<BlockId> {
    let id = circuit.next_id("RS-FF");
    let ff = circuit.add_compound_named(id, ["R", "S"], ["Q", "~Q"])?;

    // nor_r: (~Q, R) -> Q, nor_s: (S, Q) -> ~Q
    let nor_r = circuit.add_gate(GateKind::Nor, 2)?;
    let nor_s = circuit.add_gate(GateKind::Nor, 2)?;

    let q = circuit.output(nor_r, "1")?;
    let nq = circuit.output(nor_s, "1")?;

    let nq_into_r = circuit.input(nor_r, "1")?;
    let nq_sink = circuit.internal_output(ff, "~Q")?;
    circuit.connect(nq, nq_into_r).to(nq_sink);

    let q_into_s = circuit.input(nor_s, "2")?;
    let q_sink = circuit.internal_output(ff, "Q")?;
    circuit.connect(q, q_into_s).to(q_sink);

    let r = circuit.internal_input(ff, "R")?;
    let s = circuit.internal_input(ff, "S")?;
    let r_in = circuit.input(nor_r, "2")?;
    let s_in = circuit.input(nor_s, "1")?;
    circuit.connect(r, r_in);
    circuit.connect(s, s_in);

    tracing::debug!(block = circuit.block(ff).id(), "built RS flip-flop");
    Ok(ff)
}

/// Builds an exclusive-or from four NAND gates.
///
/// Ports: inputs `A`, `B`; output `Y`. Id prefix `XOR`.
///
/// The two middle gates reconverge on the last one, so a change on the
/// inputs needs [`Circuit::settle`] rather than a single pass.
pub fn xor(circuit: &mut Circuit) -> CircuitResult<BlockId> {
    let id = circuit.next_id("XOR");
    let block = circuit.add_compound_named(id, ["A", "B"], ["Y"])?;

    let ab = circuit.add_gate(GateKind::Nand, 2)?;
    let a_side = circuit.add_gate(GateKind::Nand, 2)?;
    let b_side = circuit.add_gate(GateKind::Nand, 2)?;
    let out = circuit.add_gate(GateKind::Nand, 2)?;

    let a = circuit.internal_input(block, "A")?;
    let b = circuit.internal_input(block, "B")?;
    let (ab_1, ab_2) = (circuit.input(ab, "1")?, circuit.input(ab, "2")?);
    let (a_side_1, a_side_2) = (circuit.input(a_side, "1")?, circuit.input(a_side, "2")?);
    let (b_side_1, b_side_2) = (circuit.input(b_side, "1")?, circuit.input(b_side, "2")?);
    let (out_1, out_2) = (circuit.input(out, "1")?, circuit.input(out, "2")?);
    let y_sink = circuit.internal_output(block, "Y")?;

    circuit.connect(a, ab_1).to(a_side_1);
    circuit.connect(b, ab_2).to(b_side_2);

    let ab_out = circuit.output(ab, "1")?;
    circuit.connect(ab_out, a_side_2).to(b_side_1);

    let a_side_out = circuit.output(a_side, "1")?;
    let b_side_out = circuit.output(b_side, "1")?;
    circuit.connect(a_side_out, out_1);
    circuit.connect(b_side_out, out_2);

    let y = circuit.output(out, "1")?;
    circuit.connect(y, y_sink);

    Ok(block)
}

/// Builds a half adder from a nested [`xor`] and an AND gate.
///
/// Ports: inputs `A`, `B`; outputs `SUM`, `CARRY`. Id prefix `HA`.
pub fn half_adder(circuit: &mut Circuit) -> CircuitResult<BlockId> {
    let id = circuit.next_id("HA");
    let block = circuit.add_compound_named(id, ["A", "B"], ["SUM", "CARRY"])?;

    let sum = xor(circuit)?;
    let carry = circuit.add_gate(GateKind::And, 2)?;

    let a = circuit.internal_input(block, "A")?;
    let b = circuit.internal_input(block, "B")?;
    let (sum_a, sum_b) = (circuit.input(sum, "A")?, circuit.input(sum, "B")?);
    let (carry_1, carry_2) = (circuit.input(carry, "1")?, circuit.input(carry, "2")?);
    circuit.connect(a, sum_a).to(carry_1);
    circuit.connect(b, sum_b).to(carry_2);

    let sum_out = circuit.output(sum, "Y")?;
    let carry_out = circuit.output(carry, "1")?;
    let sum_sink = circuit.internal_output(block, "SUM")?;
    let carry_sink = circuit.internal_output(block, "CARRY")?;
    circuit.connect(sum_out, sum_sink);
    circuit.connect(carry_out, carry_sink);

    Ok(block)
}

/// Builds a sum-of-products compound from the output column of a truth
/// table.
///
/// `column` holds the output for every input combination in binary counting
/// order, input `1` being the most significant bit. This is the row order of
/// [`TruthTable`](crate::TruthTable). Its length must be a power of two of at
/// least 2.
///
/// Ports: inputs `1`..`n`; output `1`. Id prefix `COMB`.
///
/// Every high row becomes an AND of one literal per input and the terms meet
/// in an OR. With no high row the output is left undriven and reads low.
/// Inverted literals reconverge with the direct ones, so evaluate with
/// [`Circuit::settle`].
pub fn combinational(circuit: &mut Circuit, column: &[Level]) -> CircuitResult<BlockId> {
    let rows = column.len();
    if rows < 2 || !rows.is_power_of_two() {
        return Err(CircuitError::MalformedTable { rows });
    }
    let inputs = rows.trailing_zeros() as usize;
    let id = circuit.next_id("COMB");
    if inputs > MAX_TABLE_INPUTS {
        return Err(CircuitError::TooManyInputs {
            block: id,
            inputs,
            max: MAX_TABLE_INPUTS,
        });
    }

    let minterms: Vec<usize> = column
        .iter()
        .enumerate()
        .filter(|(_, level)| level.is_one())
        .map(|(row, _)| row)
        .collect();

    let block = circuit.add_compound(id, inputs, 1)?;
    if minterms.is_empty() {
        tracing::debug!(block = circuit.block(block).id(), "built constant-low circuit");
        return Ok(block);
    }

    let sources = (1..=inputs)
        .map(|i| circuit.internal_input(block, &i.to_string()))
        .collect::<CircuitResult<Vec<_>>>()?;
    let sink = circuit.internal_output(block, "1")?;

    // One inverter per input, created on first use.
    let mut inverted: Vec<Option<OutputRef>> = vec![None; inputs];
    let or = circuit.add_gate(GateKind::Or, minterms.len())?;

    for (term, &row) in minterms.iter().enumerate() {
        let and = circuit.add_gate(GateKind::And, inputs)?;
        for (i, &source) in sources.iter().enumerate() {
            let literal = if (row >> (inputs - 1 - i)) & 1 == 1 {
                source
            } else if let Some(out) = inverted[i] {
                out
            } else {
                let not = circuit.add_gate(GateKind::Not, 1)?;
                let not_in = circuit.input(not, "1")?;
                circuit.connect(source, not_in);
                let out = circuit.output(not, "1")?;
                inverted[i] = Some(out);
                out
            };
            let and_in = circuit.input(and, &(i + 1).to_string())?;
            circuit.connect(literal, and_in);
        }
        let and_out = circuit.output(and, "1")?;
        let or_in = circuit.input(or, &(term + 1).to_string())?;
        circuit.connect(and_out, or_in);
    }

    let or_out = circuit.output(or, "1")?;
    circuit.connect(or_out, sink);

    tracing::debug!(
        block = circuit.block(block).id(),
        inputs,
        terms = minterms.len(),
        "built combinational circuit"
    );
    Ok(block)
}

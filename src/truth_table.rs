//! Exhaustive truth tables.
//!
//! A table drives every combination of a block's external inputs and
//! records the settled outputs. Rows are counted in binary with the first
//! input as the most significant bit. Each row starts from a fresh clone of
//! the circuit, so rows never see state left by another row. For latches
//! this means each row shows the state reached from the circuit as given.
//!
//! With the `parallel` feature rows are computed on the rayon thread pool.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};
use crate::types::{BlockId, Level};

/// Largest input count a table is generated for.
pub const MAX_TABLE_INPUTS: usize = 16;

/// One input combination and the outputs it settled to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthRow {
    pub inputs: Vec<Level>,
    pub outputs: Vec<Level>,
    /// Passes needed to settle
    pub passes: usize,
}

/// Truth table of a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthTable {
    block: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    rows: Vec<TruthRow>,
}

impl TruthTable {
    /// Generates the table of `block` by settling every input combination.
    pub fn generate(circuit: &Circuit, block: BlockId, settle_limit: usize) -> CircuitResult<Self> {
        let b = circuit.block(block);
        let width = b.inputs().len();
        if width > MAX_TABLE_INPUTS {
            return Err(CircuitError::TooManyInputs {
                block: b.id().to_string(),
                inputs: width,
                max: MAX_TABLE_INPUTS,
            });
        }

        let combinations: Vec<u32> = (0..1u32 << width).collect();

        #[cfg(feature = "parallel")]
        let rows = combinations
            .par_iter()
            .map(|&bits| settle_row(circuit, block, width, bits, settle_limit))
            .collect::<CircuitResult<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let rows = combinations
            .iter()
            .map(|&bits| settle_row(circuit, block, width, bits, settle_limit))
            .collect::<CircuitResult<Vec<_>>>()?;

        tracing::debug!(block = b.id(), rows = rows.len(), "truth table generated");

        Ok(Self {
            block: b.id().to_string(),
            inputs: b.input_names().into_iter().map(String::from).collect(),
            outputs: b.output_names().into_iter().map(String::from).collect(),
            rows,
        })
    }

    /// Id of the block the table describes.
    pub fn block(&self) -> &str {
        &self.block
    }

    pub fn input_names(&self) -> &[String] {
        &self.inputs
    }

    pub fn output_names(&self) -> &[String] {
        &self.outputs
    }

    pub fn rows(&self) -> &[TruthRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Outputs recorded for an input combination.
    pub fn lookup(&self, inputs: &[Level]) -> Option<&[Level]> {
        self.rows
            .iter()
            .find(|row| row.inputs == inputs)
            .map(|row| row.outputs.as_slice())
    }

    /// Most passes any row needed to settle.
    pub fn max_passes(&self) -> usize {
        self.rows.iter().map(|r| r.passes).max().unwrap_or(0)
    }

    /// Exports the table as CSV with one column per port.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        let header: Vec<&str> = self
            .inputs
            .iter()
            .chain(&self.outputs)
            .map(String::as_str)
            .collect();
        csv.push_str(&header.join(","));
        csv.push('\n');

        for row in &self.rows {
            let cells: Vec<String> = row
                .inputs
                .iter()
                .chain(&row.outputs)
                .map(|l| l.to_string())
                .collect();
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        csv
    }
}

/// Input levels for combination `bits`, first input most significant.
fn combination(width: usize, bits: u32) -> Vec<Level> {
    (0..width)
        .map(|i| Level::from((bits >> (width - 1 - i)) & 1 == 1))
        .collect()
}

fn settle_row(
    circuit: &Circuit,
    block: BlockId,
    width: usize,
    bits: u32,
    limit: usize,
) -> CircuitResult<TruthRow> {
    let inputs = combination(width, bits);
    let mut scratch = circuit.clone();
    scratch.set_inputs(block, &inputs);
    let passes = scratch.settle(block, limit)?;
    Ok(TruthRow {
        outputs: scratch.output_levels(block),
        inputs,
        passes,
    })
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .inputs
            .iter()
            .chain(&self.outputs)
            .map(|name| name.len().max(1))
            .collect();
        let split = self.inputs.len();

        for (i, name) in self.inputs.iter().chain(&self.outputs).enumerate() {
            if i == split {
                f.write_str(" |")?;
            }
            write!(f, " {:>w$}", name, w = widths[i])?;
        }
        writeln!(f)?;

        for row in &self.rows {
            for (i, level) in row.inputs.iter().chain(&row.outputs).enumerate() {
                if i == split {
                    f.write_str(" |")?;
                }
                write!(f, " {:>w$}", level.as_char(), w = widths[i])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::gate::GateKind;

    #[test]
    fn test_combination_order() {
        assert_eq!(combination(2, 0), vec![Level::Zero, Level::Zero]);
        assert_eq!(combination(2, 1), vec![Level::Zero, Level::One]);
        assert_eq!(combination(2, 2), vec![Level::One, Level::Zero]);
        assert_eq!(combination(3, 5), vec![Level::One, Level::Zero, Level::One]);
    }

    #[test]
    fn test_nand_table() {
        let mut c = Circuit::new();
        let nand = c.add_gate(GateKind::Nand, 2).unwrap();
        let table = TruthTable::generate(&c, nand, 4).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.input_names(), &["1".to_string(), "2".to_string()]);
        let outputs: Vec<Level> = table.rows().iter().map(|r| r.outputs[0]).collect();
        assert_eq!(outputs, vec![Level::One, Level::One, Level::One, Level::Zero]);
        assert_eq!(table.lookup(&[Level::One, Level::One]), Some(&[Level::Zero][..]));
    }

    #[test]
    fn test_rows_are_independent() {
        let mut c = Circuit::new();
        let ff = factory::rs_flip_flop(&mut c).unwrap();
        let table = TruthTable::generate(&c, ff, 8).unwrap();

        // Columns are R, S. Every row starts from the freshly built latch,
        // which falls into the set state when both inputs are low.
        assert_eq!(table.lookup(&[Level::Zero, Level::Zero]), Some(&[Level::One, Level::Zero][..]));
        assert_eq!(table.lookup(&[Level::Zero, Level::One]), Some(&[Level::One, Level::Zero][..]));
        assert_eq!(table.lookup(&[Level::One, Level::Zero]), Some(&[Level::Zero, Level::One][..]));
        assert_eq!(table.lookup(&[Level::One, Level::One]), Some(&[Level::Zero, Level::Zero][..]));
        // The source circuit is untouched.
        assert_eq!(c.stats().passes, 0);
    }

    #[test]
    fn test_oscillator_fails() {
        let mut c = Circuit::new();
        let not = c.add_gate(GateKind::Not, 1).unwrap();
        let (out, inp) = (c.output(not, "1").unwrap(), c.input(not, "1").unwrap());
        c.connect(out, inp);
        assert!(matches!(
            TruthTable::generate(&c, not, 4),
            Err(CircuitError::Unsettled { .. })
        ));
    }

    #[test]
    fn test_too_many_inputs() {
        let mut c = Circuit::new();
        let wide = c.add_gate(GateKind::Or, MAX_TABLE_INPUTS + 1).unwrap();
        assert!(matches!(
            TruthTable::generate(&c, wide, 4),
            Err(CircuitError::TooManyInputs { .. })
        ));
    }

    #[test]
    fn test_rendering() {
        let mut c = Circuit::new();
        let ha = factory::half_adder(&mut c).unwrap();
        let table = TruthTable::generate(&c, ha, 8).unwrap();

        let csv = table.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "A,B,SUM,CARRY");
        assert_eq!(lines[4], "1,1,0,1");

        let text = table.to_string();
        assert!(text.starts_with(" A B | SUM CARRY\n"));
        assert_eq!(text.lines().count(), 5);
    }
}

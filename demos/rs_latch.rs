//! RS latch example.
//!
//! Builds an RS flip-flop from two cross-coupled NOR gates, drives it through
//! set, hold and reset, and prints Q and ~Q after a single pass and after
//! settling. A half adder loaded from a netlist prints its truth table, and
//! the evaluation statistics follow.
//!
//! Run with `cargo run --example rs_latch`. Set `RUST_LOG=gatework=debug` to
//! see every pass.

use gatework::{
    create_default_registry, factory, BlockId, Circuit, CircuitResult, Level, SimConfig,
    TruthTable,
};

const CONFIG: &str = r#"
simulation:
  log_level: warn
  settle_limit: 8
  collect_stats: true

circuit:
  id: adder
  inputs: [a, b]
  outputs: [sum, carry]
  blocks:
    - kind: library
      name: half_adder
  signals:
    - { from: adder_a, to: HA.0_A }
    - { from: adder_b, to: HA.0_B }
    - { from: HA.0_SUM, to: adder_sum }
    - { from: HA.0_CARRY, to: adder_carry }
"#;

const SEQUENCE: [(&str, Level, Level); 6] = [
    ("set", Level::One, Level::Zero),
    ("hold", Level::Zero, Level::Zero),
    ("reset", Level::Zero, Level::One),
    ("hold", Level::Zero, Level::Zero),
    ("set", Level::One, Level::Zero),
    ("both", Level::One, Level::One),
];

/// Outputs of one row: after a single pass and once settled.
struct Row {
    one_pass: (Level, Level),
    settled: (Level, Level),
    passes: usize,
}

fn main() {
    let config = match SimConfig::from_yaml(CONFIG) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid config: {err}");
            return;
        }
    };
    gatework::init_logging(&config.simulation.log_level);

    println!("==== RS latch example ====\n");

    let mut circuit = Circuit::new();
    circuit.set_collect_stats(config.simulation.collect_stats);
    let latch = match factory::rs_flip_flop(&mut circuit) {
        Ok(latch) => latch,
        Err(err) => {
            eprintln!("failed to build latch: {err}");
            return;
        }
    };

    // A set right after a reset needs a second pass, which shows up as a
    // one-pass row of `0 0`.
    println!("{:>6}  S R | 1 pass | settled | passes", "");
    for (label, s, r) in SEQUENCE {
        match drive(&mut circuit, latch, s, r, config.simulation.settle_limit) {
            Ok(row) => println!(
                "{:>6}  {} {} |  {} {}   |  {} {}    | {}",
                label, s, r, row.one_pass.0, row.one_pass.1, row.settled.0, row.settled.1, row.passes
            ),
            Err(err) => {
                eprintln!("{label}: {err}");
                return;
            }
        }
    }

    println!("\nHalf adder:");
    match config
        .build(&create_default_registry())
        .map_err(|err| err.to_string())
        .and_then(|(adder_circuit, adder)| {
            TruthTable::generate(&adder_circuit, adder, config.simulation.settle_limit)
                .map_err(|err| err.to_string())
        }) {
        Ok(table) => print!("{table}"),
        Err(err) => eprintln!("truth table failed: {err}"),
    }

    println!();
    if let Err(err) = circuit.stats().write_summary(std::io::stdout()) {
        eprintln!("could not write summary: {err}");
    }
}

fn outputs(circuit: &Circuit, latch: BlockId) -> CircuitResult<(Level, Level)> {
    Ok((circuit.output_level(latch, "Q")?, circuit.output_level(latch, "~Q")?))
}

fn drive(circuit: &mut Circuit, latch: BlockId, s: Level, r: Level, limit: usize) -> CircuitResult<Row> {
    circuit.set_input(latch, "S", s)?;
    circuit.set_input(latch, "R", r)?;
    circuit.step(latch);
    let one_pass = outputs(circuit, latch)?;
    let passes = circuit.settle(latch, limit)?;
    Ok(Row {
        one_pass,
        settled: outputs(circuit, latch)?,
        passes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_rows() {
        use Level::{One, Zero};

        let config = SimConfig::from_yaml(CONFIG).unwrap();
        assert_eq!(config.simulation.log_level, "warn");

        let mut circuit = Circuit::new();
        let latch = factory::rs_flip_flop(&mut circuit).unwrap();
        let rows: Vec<Row> = SEQUENCE
            .iter()
            .map(|&(_, s, r)| drive(&mut circuit, latch, s, r, config.simulation.settle_limit).unwrap())
            .collect();

        let settled: Vec<_> = rows.iter().map(|row| row.settled).collect();
        assert_eq!(
            settled,
            vec![(One, Zero), (One, Zero), (Zero, One), (Zero, One), (One, Zero), (Zero, Zero)]
        );
        // The second set is the only row that needed more than one pass.
        assert_eq!(rows[4].one_pass, (Zero, Zero));
        assert!(rows.iter().enumerate().all(|(i, row)| (i == 4) == (row.one_pass != row.settled)));
    }
}

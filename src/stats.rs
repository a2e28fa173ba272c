//! Evaluation statistics and export.
//!
//! Counters are accumulated by a [`Circuit`](crate::circuit::Circuit) across
//! simulation passes and can be exported as JSON or CSV.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Counters collected while evaluating a circuit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalStats {
    /// Completed `evaluate()` calls on a root block
    pub passes: u64,

    /// Gate blocks whose output was recomputed
    pub gate_evaluations: u64,

    /// Compound blocks that ran their internal network
    pub compound_evaluations: u64,

    /// Individual input writes performed by output propagation
    pub propagations: u64,

    /// Blocks whose evaluated flag was cleared
    pub unevaluations: u64,

    /// Evaluate requests skipped because the block was already evaluated
    pub guard_hits: u64,
}

impl EvalStats {
    /// Creates an empty set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of blocks evaluated.
    pub fn block_evaluations(&self) -> u64 {
        self.gate_evaluations + self.compound_evaluations
    }

    /// Adds another set of counters to this one.
    pub fn merge(&mut self, other: &EvalStats) {
        self.passes += other.passes;
        self.gate_evaluations += other.gate_evaluations;
        self.compound_evaluations += other.compound_evaluations;
        self.propagations += other.propagations;
        self.unevaluations += other.unevaluations;
        self.guard_hits += other.guard_hits;
    }

    /// Exports statistics as a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "passes": self.passes,
            "gate_evaluations": self.gate_evaluations,
            "compound_evaluations": self.compound_evaluations,
            "block_evaluations": self.block_evaluations(),
            "propagations": self.propagations,
            "unevaluations": self.unevaluations,
            "guard_hits": self.guard_hits,
        })
    }

    /// Exports statistics to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports statistics to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Exports statistics to CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("metric,value\n");
        csv.push_str(&format!("passes,{}\n", self.passes));
        csv.push_str(&format!("gate_evaluations,{}\n", self.gate_evaluations));
        csv.push_str(&format!("compound_evaluations,{}\n", self.compound_evaluations));
        csv.push_str(&format!("propagations,{}\n", self.propagations));
        csv.push_str(&format!("unevaluations,{}\n", self.unevaluations));
        csv.push_str(&format!("guard_hits,{}\n", self.guard_hits));

        csv
    }

    /// Writes a human-readable summary to a writer.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Evaluation Statistics ===")?;
        writeln!(w, "Passes:               {}", self.passes)?;
        writeln!(w, "Gate evaluations:     {}", self.gate_evaluations)?;
        writeln!(w, "Compound evaluations: {}", self.compound_evaluations)?;
        writeln!(w, "Propagations:         {}", self.propagations)?;
        writeln!(w, "Unevaluations:        {}", self.unevaluations)?;
        writeln!(w, "Re-entry guard hits:  {}", self.guard_hits)?;
        Ok(())
    }
}

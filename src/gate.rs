//! Primitive gate kinds.
//!
//! Every base block is a [`GateKind`] plus a list of inputs and exactly one
//! output. The boolean function of a gate is a single `match` over the kind,
//! so there is no per-gate type or virtual dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CircuitError, CircuitResult};
use crate::types::Level;

/// The boolean function implemented by a base block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// ONE iff every input is ONE.
    #[serde(alias = "AND")]
    And,
    /// ONE iff any input is ONE.
    #[serde(alias = "OR")]
    Or,
    /// Complement of its single input.
    #[serde(alias = "NOT")]
    Not,
    /// ZERO iff every input is ONE.
    #[serde(alias = "NAND")]
    Nand,
    /// ONE iff every input is ZERO.
    #[serde(alias = "NOR")]
    Nor,
}

impl GateKind {
    /// All gate kinds, in declaration order.
    pub const ALL: [GateKind; 5] = [
        GateKind::And,
        GateKind::Or,
        GateKind::Not,
        GateKind::Nand,
        GateKind::Nor,
    ];

    /// Prefix used for generated block ids, e.g. `AND` in `AND.3`.
    pub fn prefix(self) -> &'static str {
        match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Not => "NOT",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
        }
    }

    /// Checks that a gate of this kind may be built with `inputs` inputs.
    ///
    /// NOT takes exactly one input, every other kind at least one.
    pub fn validate_arity(self, inputs: usize) -> CircuitResult<()> {
        let ok = match self {
            GateKind::Not => inputs == 1,
            _ => inputs >= 1,
        };
        if ok {
            Ok(())
        } else {
            Err(CircuitError::MalformedGate { kind: self, inputs })
        }
    }

    /// Computes the output level for the given input levels.
    ///
    /// AND/NAND stop at the first ZERO input and OR/NOR at the first ONE
    /// input; the result does not depend on input order.
    pub fn apply(self, inputs: &[Level]) -> Level {
        match self {
            GateKind::And => Level::from(inputs.iter().all(|l| l.is_one())),
            GateKind::Or => Level::from(inputs.iter().any(|l| l.is_one())),
            GateKind::Nand => Level::from(!inputs.iter().all(|l| l.is_one())),
            GateKind::Nor => Level::from(!inputs.iter().any(|l| l.is_one())),
            GateKind::Not => !inputs.first().copied().unwrap_or_default(),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(GateKind::And),
            "or" => Ok(GateKind::Or),
            "not" => Ok(GateKind::Not),
            "nand" => Ok(GateKind::Nand),
            "nor" => Ok(GateKind::Nor),
            other => Err(format!("Unknown gate type: {}", other)),
        }
    }
}

//! Error types for circuit construction and simulation.

use thiserror::Error;

use crate::gate::GateKind;

/// Errors raised by the circuit construction and lookup API.
///
/// All of them are local and synchronous. `evaluate()` and `unevaluate()`
/// never fail on a constructed circuit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("Port '{port}' not found on block '{block}'")]
    NotFound { block: String, port: String },

    #[error("Invalid connection from {from} to {to}: a connection must run from an output to an input")]
    InvalidConnection { from: String, to: String },

    #[error("Malformed {kind} gate with {inputs} input(s)")]
    MalformedGate { kind: GateKind, inputs: usize },

    #[error("Duplicate port '{port}' on block '{block}'")]
    DuplicatePort { block: String, port: String },

    #[error("Block id already in use: {0}")]
    DuplicateId(String),

    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Block '{block}' did not settle after {passes} passes")]
    Unsettled { block: String, passes: usize },

    #[error("Block '{block}' has {inputs} inputs, truth tables support at most {max}")]
    TooManyInputs {
        block: String,
        inputs: usize,
        max: usize,
    },

    #[error("Truth table has {rows} rows, expected a power of two of at least 2")]
    MalformedTable { rows: usize },
}

/// Result type for circuit operations.
pub type CircuitResult<T> = Result<T, CircuitError>;

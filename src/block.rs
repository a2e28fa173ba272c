//! Block definitions.
//!
//! A block is a node of the circuit graph with a string id, a fixed list of
//! named inputs and outputs, and an `evaluated` flag that guards against
//! re-entry within one simulation pass.
//!
//! Two kinds exist:
//! - **Gate** blocks (base blocks) implement one [`GateKind`] over their
//!   inputs and always have exactly one output named `"1"`.
//! - **Compound** blocks wrap a sub-network. Every external input is mirrored
//!   by an internal output that drives the sub-network, and every external
//!   output is mirrored by an internal input that collects its value.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{CircuitError, CircuitResult};
use crate::gate::GateKind;
use crate::signal::{Direction, Input, Output, Side, SignalRef};
use crate::types::Level;

/// Name of the single output of every gate block.
pub const GATE_OUTPUT: &str = "1";

/// The kind of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Primitive combinational gate
    Gate(GateKind),
    /// Hierarchical container
    Compound,
}

/// A block in a circuit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    id: String,
    kind: BlockKind,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    /// Compound only: one source per external input, same names and order.
    inner_sources: Vec<Output>,
    /// Compound only: one sink per external output, same names and order.
    inner_sinks: Vec<Input>,
    evaluated: bool,
    /// Compound only: set between the start and the end of its evaluation.
    #[serde(skip)]
    pub(crate) active: bool,
}

impl Block {
    /// Creates a gate block with inputs named `"1"..="n"` and one output `"1"`.
    pub fn gate(id: impl Into<String>, kind: GateKind, inputs: usize) -> CircuitResult<Self> {
        kind.validate_arity(inputs)?;
        Ok(Self {
            id: id.into(),
            kind: BlockKind::Gate(kind),
            inputs: (1..=inputs).map(|i| Input::new(i.to_string())).collect(),
            outputs: vec![Output::new(GATE_OUTPUT)],
            inner_sources: Vec::new(),
            inner_sinks: Vec::new(),
            evaluated: false,
            active: false,
        })
    }

    /// Creates a compound block with the given port names.
    ///
    /// Input names must be unique among inputs and output names among
    /// outputs. An input and an output may share a name.
    pub fn compound<I, O>(id: impl Into<String>, inputs: I, outputs: O) -> CircuitResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        let id = id.into();
        let inputs: Vec<String> = inputs.into_iter().map(Into::into).collect();
        let outputs: Vec<String> = outputs.into_iter().map(Into::into).collect();
        check_unique(&id, &inputs)?;
        check_unique(&id, &outputs)?;

        Ok(Self {
            id,
            kind: BlockKind::Compound,
            inner_sources: inputs.iter().map(Output::new).collect(),
            inner_sinks: outputs.iter().map(Input::new).collect(),
            inputs: inputs.into_iter().map(Input::new).collect(),
            outputs: outputs.into_iter().map(Output::new).collect(),
            evaluated: false,
            active: false,
        })
    }

    /// Block identification.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Block kind.
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Returns the gate kind for gate blocks.
    pub fn gate_kind(&self) -> Option<GateKind> {
        match self.kind {
            BlockKind::Gate(kind) => Some(kind),
            BlockKind::Compound => None,
        }
    }

    /// Returns true for compound blocks.
    pub fn is_compound(&self) -> bool {
        self.kind == BlockKind::Compound
    }

    /// Whether this block has been evaluated in the current pass.
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    pub(crate) fn mark_evaluated(&mut self) {
        self.evaluated = true;
    }

    pub(crate) fn reset_evaluated(&mut self) {
        self.evaluated = false;
    }

    /// External inputs in declaration order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// External outputs in declaration order.
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Names of the external inputs in declaration order.
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(Input::name).collect()
    }

    /// Names of the external outputs in declaration order.
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(Output::name).collect()
    }

    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|i| i.name() == name)
    }

    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|o| o.name() == name)
    }

    /// Current levels of the external inputs.
    pub fn input_levels(&self) -> Vec<Level> {
        self.inputs.iter().map(Input::get).collect()
    }

    /// Current levels of the external outputs.
    pub fn output_levels(&self) -> Vec<Level> {
        self.outputs.iter().map(Output::get).collect()
    }

    /// Reads the level of one of this block's signals.
    ///
    /// Returns `None` if the address does not exist on this block.
    pub fn level(&self, signal: &SignalRef) -> Option<Level> {
        match (signal.side, signal.direction) {
            (Side::External, Direction::Input) => self.inputs.get(signal.index).map(Input::get),
            (Side::External, Direction::Output) => self.outputs.get(signal.index).map(Output::get),
            (Side::Internal, Direction::Input) => self.inner_sinks.get(signal.index).map(Input::get),
            (Side::Internal, Direction::Output) => {
                self.inner_sources.get(signal.index).map(Output::get)
            }
        }
    }

    /// Returns the name of one of this block's signals.
    pub fn signal_name(&self, signal: &SignalRef) -> Option<&str> {
        match (signal.side, signal.direction) {
            (Side::External, Direction::Input) => self.inputs.get(signal.index).map(Input::name),
            (Side::External, Direction::Output) => self.outputs.get(signal.index).map(Output::name),
            (Side::Internal, Direction::Input) => {
                self.inner_sinks.get(signal.index).map(Input::name)
            }
            (Side::Internal, Direction::Output) => {
                self.inner_sources.get(signal.index).map(Output::name)
            }
        }
    }

    pub(crate) fn sink_mut(&mut self, side: Side, index: usize) -> Option<&mut Input> {
        match side {
            Side::External => self.inputs.get_mut(index),
            Side::Internal => self.inner_sinks.get_mut(index),
        }
    }

    pub(crate) fn source(&self, side: Side, index: usize) -> Option<&Output> {
        match side {
            Side::External => self.outputs.get(index),
            Side::Internal => self.inner_sources.get(index),
        }
    }

    pub(crate) fn source_mut(&mut self, side: Side, index: usize) -> Option<&mut Output> {
        match side {
            Side::External => self.outputs.get_mut(index),
            Side::Internal => self.inner_sources.get_mut(index),
        }
    }

    /// Internal sources of a compound block (empty for gates).
    pub fn inner_sources(&self) -> &[Output] {
        &self.inner_sources
    }

    /// Internal sinks of a compound block (empty for gates).
    pub fn inner_sinks(&self) -> &[Input] {
        &self.inner_sinks
    }

    /// Compound step: copies every external input onto its internal source.
    pub(crate) fn load_inner_sources(&mut self) {
        for (src, input) in self.inner_sources.iter_mut().zip(&self.inputs) {
            src.set(input.get());
        }
    }

    /// Compound step: copies every internal sink onto its external output.
    pub(crate) fn store_outputs(&mut self) {
        for (out, sink) in self.outputs.iter_mut().zip(&self.inner_sinks) {
            out.set(sink.get());
        }
    }

    /// Gate step: recomputes the output from the current inputs.
    pub(crate) fn compute_gate(&mut self) -> Option<Level> {
        let kind = self.gate_kind()?;
        let level = kind.apply(&self.input_levels());
        self.outputs[0].set(level);
        Some(level)
    }

    /// Snapshot of every level held by this block, used to detect change
    /// between passes.
    pub(crate) fn snapshot_into(&self, out: &mut Vec<Level>) {
        out.extend(self.inputs.iter().map(Input::get));
        out.extend(self.outputs.iter().map(Output::get));
        out.extend(self.inner_sources.iter().map(Output::get));
        out.extend(self.inner_sinks.iter().map(Input::get));
    }
}

fn check_unique(block: &str, names: &[String]) -> CircuitResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(CircuitError::DuplicatePort {
                block: block.to_string(),
                port: name.clone(),
            });
        }
    }
    Ok(())
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

//! The circuit workspace.
//!
//! A [`Circuit`] owns every block of a network in an arena and is the entry
//! point for construction (creating blocks, wiring outputs to inputs), signal
//! access and, via [`crate::engine`], simulation.
//!
//! Connections are stored only as fan-out entries of outputs. An input knows
//! its owner block through its [`InputRef`], which is all the traversal needs.
//!
//! # Example
//!
//! ```
//! use gatework::{Circuit, GateKind, Level};
//!
//! let mut c = Circuit::new();
//! let and = c.add_gate(GateKind::And, 2).unwrap();
//! let not = c.add_gate(GateKind::Not, 1).unwrap();
//!
//! let and_out = c.output(and, "1").unwrap();
//! let not_in = c.input(not, "1").unwrap();
//! c.connect(and_out, not_in);
//!
//! c.set(c.input(and, "1").unwrap(), Level::One);
//! c.set(c.input(and, "2").unwrap(), Level::One);
//! c.step(and);
//!
//! assert_eq!(c.level(c.output(not, "1").unwrap()), Level::Zero);
//! ```

use std::collections::HashMap;

use crate::block::Block;
use crate::error::{CircuitError, CircuitResult};
use crate::gate::GateKind;
use crate::ids::IdAllocator;
use crate::signal::{InputRef, Output, OutputRef, Side, SignalRef};
use crate::stats::EvalStats;
use crate::types::{BlockId, Level};

/// A workspace of blocks and the connections between them.
#[derive(Clone, Debug)]
pub struct Circuit {
    /// Blocks indexed by [`BlockId`]
    blocks: Vec<Block>,
    /// Mapping from string id to handle, enforcing unique ids
    by_id: HashMap<String, BlockId>,
    /// Generator for automatic ids
    ids: IdAllocator,
    /// Counters accumulated by the engine
    pub(crate) stats: EvalStats,
    /// Whether per-block counters are accumulated; passes are always counted
    pub(crate) collect_stats: bool,
}

impl Default for Circuit {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            by_id: HashMap::new(),
            ids: IdAllocator::default(),
            stats: EvalStats::default(),
            collect_stats: true,
        }
    }
}

impl Circuit {
    /// Creates an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty circuit that draws generated ids from `ids`.
    pub fn with_allocator(ids: IdAllocator) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// Number of blocks in the circuit.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the circuit contains no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates over all blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().enumerate().map(|(i, b)| (BlockId(i), b))
    }

    /// Returns a block by handle.
    ///
    /// # Panics
    /// If `id` was not issued by this circuit.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    /// Looks up a block handle by its string id.
    pub fn find_block(&self, id: &str) -> Option<BlockId> {
        self.by_id.get(id).copied()
    }

    /// Looks up a block handle by its string id, failing if absent.
    pub fn block_by_id(&self, id: &str) -> CircuitResult<BlockId> {
        self.find_block(id)
            .ok_or_else(|| CircuitError::UnknownBlock(id.to_string()))
    }

    /// Generates the next free id for `prefix`, e.g. `AND.4`.
    pub fn next_id(&mut self, prefix: &str) -> String {
        let by_id = &self.by_id;
        self.ids.next_free(prefix, |id| by_id.contains_key(id))
    }

    fn insert(&mut self, block: Block) -> CircuitResult<BlockId> {
        if self.by_id.contains_key(block.id()) {
            return Err(CircuitError::DuplicateId(block.id().to_string()));
        }
        let handle = BlockId(self.blocks.len());
        self.by_id.insert(block.id().to_string(), handle);
        tracing::trace!(block = block.id(), compound = block.is_compound(), "block added");
        self.blocks.push(block);
        Ok(handle)
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Adds a gate with a generated id such as `NOR.3`.
    pub fn add_gate(&mut self, kind: GateKind, inputs: usize) -> CircuitResult<BlockId> {
        kind.validate_arity(inputs)?;
        let id = self.next_id(kind.prefix());
        self.add_gate_with_id(id, kind, inputs)
    }

    /// Adds a gate with a caller-supplied id.
    pub fn add_gate_with_id(
        &mut self,
        id: impl Into<String>,
        kind: GateKind,
        inputs: usize,
    ) -> CircuitResult<BlockId> {
        let block = Block::gate(id, kind, inputs)?;
        self.insert(block)
    }

    /// Adds a compound block with ports numbered `"1"..="n"`.
    pub fn add_compound(
        &mut self,
        id: impl Into<String>,
        inputs: usize,
        outputs: usize,
    ) -> CircuitResult<BlockId> {
        self.add_compound_named(
            id,
            (1..=inputs).map(|i| i.to_string()),
            (1..=outputs).map(|i| i.to_string()),
        )
    }

    /// Adds a compound block with explicit ordered port names.
    pub fn add_compound_named<I, O>(
        &mut self,
        id: impl Into<String>,
        inputs: I,
        outputs: O,
    ) -> CircuitResult<BlockId>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        let block = Block::compound(id, inputs, outputs)?;
        self.insert(block)
    }

    // ------------------------------------------------------------------
    // Port lookup
    // ------------------------------------------------------------------

    fn not_found(&self, block: BlockId, port: &str) -> CircuitError {
        CircuitError::NotFound {
            block: self.block(block).id().to_string(),
            port: port.to_string(),
        }
    }

    /// Returns the external input `name` of `block`.
    pub fn input(&self, block: BlockId, name: &str) -> CircuitResult<InputRef> {
        self.block(block)
            .input_index(name)
            .map(|i| InputRef::new(block, Side::External, i))
            .ok_or_else(|| self.not_found(block, name))
    }

    /// Returns the external output `name` of `block`.
    pub fn output(&self, block: BlockId, name: &str) -> CircuitResult<OutputRef> {
        self.block(block)
            .output_index(name)
            .map(|i| OutputRef::new(block, Side::External, i))
            .ok_or_else(|| self.not_found(block, name))
    }

    /// Returns the internal output that mirrors external input `name` of a
    /// compound block. Blocks inside the compound connect to it to read that
    /// input.
    pub fn internal_input(&self, block: BlockId, name: &str) -> CircuitResult<OutputRef> {
        let b = self.block(block);
        if !b.is_compound() {
            return Err(self.not_found(block, name));
        }
        b.input_index(name)
            .map(|i| OutputRef::new(block, Side::Internal, i))
            .ok_or_else(|| self.not_found(block, name))
    }

    /// Returns the internal input that mirrors external output `name` of a
    /// compound block. Blocks inside the compound connect to it to drive
    /// that output.
    pub fn internal_output(&self, block: BlockId, name: &str) -> CircuitResult<InputRef> {
        let b = self.block(block);
        if !b.is_compound() {
            return Err(self.not_found(block, name));
        }
        b.output_index(name)
            .map(|i| InputRef::new(block, Side::Internal, i))
            .ok_or_else(|| self.not_found(block, name))
    }

    /// Returns every input handle of `block` in declaration order.
    pub fn inputs_of(&self, block: BlockId) -> Vec<InputRef> {
        (0..self.block(block).inputs().len())
            .map(|i| InputRef::new(block, Side::External, i))
            .collect()
    }

    /// Returns every output handle of `block` in declaration order.
    pub fn outputs_of(&self, block: BlockId) -> Vec<OutputRef> {
        (0..self.block(block).outputs().len())
            .map(|i| OutputRef::new(block, Side::External, i))
            .collect()
    }

    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    fn source(&self, r: OutputRef) -> Option<&Output> {
        self.blocks
            .get(r.block().0)
            .and_then(|b| b.source(r.0.side, r.0.index))
    }

    fn source_mut(&mut self, r: OutputRef) -> Option<&mut Output> {
        self.blocks
            .get_mut(r.block().0)
            .and_then(|b| b.source_mut(r.0.side, r.0.index))
    }

    /// Starts a fluent wiring chain from `from`.
    ///
    /// Every [`Connector::to`] on a `from` not issued by this circuit is
    /// ignored with a warning.
    pub fn wire(&mut self, from: OutputRef) -> Connector<'_> {
        Connector {
            circuit: self,
            from,
        }
    }

    /// Connects `from` to `to` and returns a handle for further connections
    /// from the same output.
    ///
    /// Unlike [`block`](Self::block), this does not panic on a foreign
    /// handle: if `from` was not issued by this circuit the connection is
    /// dropped and a warning is logged. Use
    /// [`connect_signals`](Self::connect_signals) to get an error instead.
    ///
    /// ```
    /// # use gatework::{Circuit, GateKind};
    /// let mut c = Circuit::new();
    /// let src = c.add_gate(GateKind::Not, 1).unwrap();
    /// let a = c.add_gate(GateKind::Not, 1).unwrap();
    /// let b = c.add_gate(GateKind::Not, 1).unwrap();
    /// let out = c.output(src, "1").unwrap();
    /// let (ia, ib) = (c.input(a, "1").unwrap(), c.input(b, "1").unwrap());
    /// c.connect(out, ia).to(ib);
    /// assert_eq!(c.fan_out(out), &[ia, ib]);
    /// ```
    pub fn connect(&mut self, from: OutputRef, to: InputRef) -> Connector<'_> {
        self.wire(from).to(to)
    }

    /// Connects two untyped signals.
    ///
    /// Fails with [`CircuitError::InvalidConnection`] unless `from` is an
    /// output and `to` is an input; the circuit is left unchanged.
    pub fn connect_signals(&mut self, from: SignalRef, to: SignalRef) -> CircuitResult<OutputRef> {
        match (OutputRef::try_from(from), InputRef::try_from(to)) {
            (Ok(src), Ok(dst)) => {
                let sink_exists = self
                    .blocks
                    .get(dst.block().0)
                    .and_then(|b| b.level(&to))
                    .is_some();
                if self.source(src).is_none() || !sink_exists {
                    return Err(CircuitError::InvalidConnection {
                        from: self.address(from),
                        to: self.address(to),
                    });
                }
                self.connect(src, dst);
                Ok(src)
            }
            _ => Err(CircuitError::InvalidConnection {
                from: self.address(from),
                to: self.address(to),
            }),
        }
    }

    /// Removes the first connection from `from` to `to`.
    ///
    /// Returns false if no such connection exists.
    pub fn disconnect(&mut self, from: OutputRef, to: InputRef) -> bool {
        self.source_mut(from)
            .map(|out| out.disconnect(to))
            .unwrap_or(false)
    }

    /// Inputs driven by `from`, in connection order.
    pub fn fan_out(&self, from: OutputRef) -> &[InputRef] {
        self.source(from).map(Output::fan_out).unwrap_or(&[])
    }

    /// Every output whose fan-out contains `to`.
    ///
    /// A well-formed circuit has at most one driver per input; this is not
    /// enforced.
    pub fn drivers_of(&self, to: InputRef) -> Vec<OutputRef> {
        let mut drivers = Vec::new();
        for (id, block) in self.blocks() {
            for (i, out) in block.outputs().iter().enumerate() {
                if out.fan_out().contains(&to) {
                    drivers.push(OutputRef::new(id, Side::External, i));
                }
            }
            for (i, src) in block.inner_sources().iter().enumerate() {
                if src.fan_out().contains(&to) {
                    drivers.push(OutputRef::new(id, Side::Internal, i));
                }
            }
        }
        drivers
    }

    /// Writes the level of `from` into every input of its fan-out, in order.
    ///
    /// Does not evaluate anything. If an input is driven by several outputs
    /// the last propagation wins. Returns the number of writes.
    pub fn propagate(&mut self, from: OutputRef) -> usize {
        let (level, targets) = match self.source(from) {
            Some(out) => (out.get(), out.fan_out().to_vec()),
            None => return 0,
        };
        for target in &targets {
            if let Some(input) = self
                .blocks
                .get_mut(target.block().0)
                .and_then(|b| b.sink_mut(target.0.side, target.0.index))
            {
                input.set(level);
            }
        }
        if self.collect_stats {
            self.stats.propagations += targets.len() as u64;
        }
        targets.len()
    }

    // ------------------------------------------------------------------
    // Signal values
    // ------------------------------------------------------------------

    /// Sets the level of an input.
    pub fn set(&mut self, input: InputRef, level: impl Into<Level>) {
        if let Some(sink) = self
            .blocks
            .get_mut(input.block().0)
            .and_then(|b| b.sink_mut(input.0.side, input.0.index))
        {
            sink.set(level.into());
        }
    }

    /// Reads the current level of any signal.
    pub fn level(&self, signal: impl Into<SignalRef>) -> Level {
        let signal = signal.into();
        self.blocks
            .get(signal.block.0)
            .and_then(|b| b.level(&signal))
            .unwrap_or_default()
    }

    /// Sets the external input `name` of `block`.
    pub fn set_input(
        &mut self,
        block: BlockId,
        name: &str,
        level: impl Into<Level>,
    ) -> CircuitResult<()> {
        let input = self.input(block, name)?;
        self.set(input, level);
        Ok(())
    }

    /// Reads the external output `name` of `block`.
    pub fn output_level(&self, block: BlockId, name: &str) -> CircuitResult<Level> {
        let output = self.output(block, name)?;
        Ok(self.level(output))
    }

    /// Sets all external inputs of `block` in declaration order.
    ///
    /// Extra levels are ignored; missing ones leave inputs untouched.
    pub fn set_inputs(&mut self, block: BlockId, levels: &[Level]) {
        for (input, level) in self.inputs_of(block).into_iter().zip(levels) {
            self.set(input, *level);
        }
    }

    /// Reads all external outputs of `block` in declaration order.
    pub fn output_levels(&self, block: BlockId) -> Vec<Level> {
        self.block(block).output_levels()
    }

    /// Renders a signal as `"blockId_portName"`.
    pub fn address(&self, signal: impl Into<SignalRef>) -> String {
        let signal = signal.into();
        match self.blocks.get(signal.block.0) {
            Some(block) => format!(
                "{}_{}",
                block.id(),
                block.signal_name(&signal).unwrap_or("?")
            ),
            None => format!("{}_?", signal.block),
        }
    }

    /// Every level held anywhere in the circuit, in a fixed order.
    pub(crate) fn snapshot(&self) -> Vec<Level> {
        let mut levels = Vec::new();
        for block in &self.blocks {
            block.snapshot_into(&mut levels);
        }
        levels
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    /// Counters accumulated since creation or the last reset.
    pub fn stats(&self) -> &EvalStats {
        &self.stats
    }

    /// Enables or disables the per-block counters (evaluations,
    /// propagations, unevaluations, guard hits). Passes are always counted.
    pub fn set_collect_stats(&mut self, enable: bool) {
        self.collect_stats = enable;
    }

    /// Whether per-block counters are being accumulated.
    pub fn collects_stats(&self) -> bool {
        self.collect_stats
    }

    /// Resets all counters.
    pub fn reset_stats(&mut self) {
        self.stats = EvalStats::default();
    }

    /// Exports the counters together with circuit size information.
    pub fn export_stats(&self) -> serde_json::Value {
        let compounds = self.blocks.iter().filter(|b| b.is_compound()).count();
        serde_json::json!({
            "blocks": self.blocks.len(),
            "gates": self.blocks.len() - compounds,
            "compounds": compounds,
            "evaluation": self.stats.to_value(),
        })
    }
}

/// Fluent wiring handle returned by [`Circuit::connect`] and
/// [`Circuit::wire`].
pub struct Connector<'a> {
    circuit: &'a mut Circuit,
    from: OutputRef,
}

impl<'a> Connector<'a> {
    /// Appends `input` to the fan-out of the output this chain started from.
    ///
    /// Ignored with a warning if that output does not belong to the circuit.
    pub fn to(self, input: InputRef) -> Self {
        match self.circuit.source_mut(self.from) {
            Some(out) => out.connect(input),
            None => tracing::warn!(from = ?self.from, "connect from unknown output ignored"),
        }
        self
    }

    /// The output this chain connects from.
    pub fn output(&self) -> OutputRef {
        self.from
    }
}

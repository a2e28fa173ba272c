//! Simulation passes.
//!
//! One pass is `evaluate` followed by `unevaluate` on a root block. Both walk
//! the fan-out graph depth-first with an explicit task stack, so circuit depth
//! is bounded by heap rather than call stack.
//!
//! Evaluation rules:
//! - A block whose evaluated flag is set is skipped. This is what makes
//!   feedback networks terminate.
//! - A gate recomputes its output, propagates it, sets its flag and then
//!   evaluates the owners of its fan-out, except compound blocks.
//! - A compound copies its external inputs onto its internal sources,
//!   propagates them and evaluates every owner of that internal fan-out
//!   (nested compound blocks included). Once that sub-network is done it
//!   copies its internal sinks onto its external outputs, propagates them,
//!   sets its flag and evaluates downstream owners, except compound blocks.
//!
//! There is no fixpoint iteration inside a pass. [`Circuit::settle`] repeats
//! passes until nothing changes.

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};
use crate::signal::{OutputRef, Side};
use crate::types::BlockId;

#[derive(Clone, Copy, Debug)]
enum Task {
    /// Evaluate a block, or skip it if already evaluated.
    Evaluate(BlockId),
    /// Second half of a compound evaluation, run once its sub-network is done.
    FinishCompound(BlockId),
}

impl Circuit {
    /// Evaluates `root` and everything reachable from it.
    ///
    /// Calling this again before [`unevaluate`](Self::unevaluate) is a no-op.
    pub fn evaluate(&mut self, root: BlockId) {
        let mut stack = vec![Task::Evaluate(root)];
        let mut targets = Vec::new();

        while let Some(task) = stack.pop() {
            match task {
                Task::Evaluate(id) => self.begin(id, &mut stack, &mut targets),
                Task::FinishCompound(id) => self.finish_compound(id, &mut stack, &mut targets),
            }
        }

        self.stats.passes += 1;
        tracing::debug!(
            root = self.block(root).id(),
            gates = self.stats.gate_evaluations,
            compounds = self.stats.compound_evaluations,
            "evaluation pass complete"
        );
    }

    fn begin(&mut self, id: BlockId, stack: &mut Vec<Task>, targets: &mut Vec<BlockId>) {
        let block = self.block(id);
        if block.is_evaluated() || block.active {
            if self.collect_stats {
                self.stats.guard_hits += 1;
            }
            return;
        }

        if block.is_compound() {
            tracing::debug!(block = block.id(), "evaluating compound block");
            self.block_mut(id).active = true;

            let sources = self.block(id).inner_sources().len();
            for i in 0..sources {
                let block = self.block_mut(id);
                let level = block.inputs()[i].get();
                if let Some(src) = block.source_mut(Side::Internal, i) {
                    src.set(level);
                }
                self.propagate(OutputRef::new(id, Side::Internal, i));
            }

            stack.push(Task::FinishCompound(id));
            self.schedule_next_hops(id, Side::Internal, false, stack, targets);
        } else {
            let level = self.block_mut(id).compute_gate();
            tracing::trace!(block = self.block(id).id(), ?level, "gate evaluated");
            self.propagate(OutputRef::new(id, Side::External, 0));
            self.block_mut(id).mark_evaluated();
            if self.collect_stats {
                self.stats.gate_evaluations += 1;
            }
            self.schedule_next_hops(id, Side::External, true, stack, targets);
        }
    }

    fn finish_compound(&mut self, id: BlockId, stack: &mut Vec<Task>, targets: &mut Vec<BlockId>) {
        self.block_mut(id).store_outputs();
        for i in 0..self.block(id).outputs().len() {
            self.propagate(OutputRef::new(id, Side::External, i));
        }

        let block = self.block_mut(id);
        block.mark_evaluated();
        block.active = false;
        if self.collect_stats {
            self.stats.compound_evaluations += 1;
        }

        self.schedule_next_hops(id, Side::External, true, stack, targets);
    }

    /// Collects the owners of every fan-out entry on one side of `id` and
    /// pushes them so that they pop in connection order.
    fn schedule_next_hops(
        &self,
        id: BlockId,
        side: Side,
        skip_compounds: bool,
        stack: &mut Vec<Task>,
        targets: &mut Vec<BlockId>,
    ) {
        targets.clear();
        self.collect_owners(id, side, skip_compounds, targets);
        stack.extend(targets.drain(..).rev().map(Task::Evaluate));
    }

    fn collect_owners(
        &self,
        id: BlockId,
        side: Side,
        skip_compounds: bool,
        targets: &mut Vec<BlockId>,
    ) {
        let block = self.block(id);
        let sources = match side {
            Side::External => block.outputs(),
            Side::Internal => block.inner_sources(),
        };
        for out in sources {
            for input in out.fan_out() {
                let owner = input.block();
                if skip_compounds && self.block(owner).is_compound() {
                    continue;
                }
                targets.push(owner);
            }
        }
    }

    /// Clears the evaluated flag of `root` and of every evaluated block
    /// reachable from it.
    ///
    /// Descent stops at blocks whose flag is already clear.
    pub fn unevaluate(&mut self, root: BlockId) {
        let mut stack = vec![root];
        let mut targets = Vec::new();
        let mut first = true;

        while let Some(id) = stack.pop() {
            if !first && !self.block(id).is_evaluated() {
                continue;
            }
            first = false;

            self.block_mut(id).reset_evaluated();
            if self.collect_stats {
                self.stats.unevaluations += 1;
            }

            targets.clear();
            if self.block(id).is_compound() {
                self.collect_owners(id, Side::Internal, false, &mut targets);
            }
            self.collect_owners(id, Side::External, true, &mut targets);
            stack.extend(targets.drain(..).rev());
        }
    }

    /// Whether `block` has been evaluated in the current pass.
    pub fn is_evaluated(&self, block: BlockId) -> bool {
        self.block(block).is_evaluated()
    }

    /// Runs one simulation pass on `root`.
    pub fn step(&mut self, root: BlockId) {
        self.evaluate(root);
        self.unevaluate(root);
    }

    /// Runs one simulation pass over several roots.
    ///
    /// All roots are evaluated in order before any is unevaluated, so a block
    /// reached from an earlier root is not evaluated again from a later one.
    pub fn step_many(&mut self, roots: &[BlockId]) {
        for &root in roots {
            self.evaluate(root);
        }
        for &root in roots {
            self.unevaluate(root);
        }
    }

    /// Repeats [`step`](Self::step) until a pass leaves every signal in the
    /// circuit unchanged.
    ///
    /// Returns the number of passes run, including the final one that
    /// changed nothing.
    pub fn settle(&mut self, root: BlockId, limit: usize) -> CircuitResult<usize> {
        self.settle_many(&[root], limit)
    }

    /// Like [`settle`](Self::settle) but drives several roots per pass.
    pub fn settle_many(&mut self, roots: &[BlockId], limit: usize) -> CircuitResult<usize> {
        let mut before = self.snapshot();
        for pass in 1..=limit {
            self.step_many(roots);
            let after = self.snapshot();
            if after == before {
                tracing::debug!(passes = pass, "circuit settled");
                return Ok(pass);
            }
            before = after;
        }

        let block = roots
            .first()
            .map(|&r| self.block(r).id().to_string())
            .unwrap_or_default();
        tracing::warn!(block = %block, passes = limit, "circuit did not settle");
        Err(CircuitError::Unsettled {
            block,
            passes: limit,
        })
    }
}

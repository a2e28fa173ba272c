//! Signals, ports and signal addressing.
//!
//! A signal is a named [`Level`] slot owned by exactly one block. Inputs are
//! plain signals; outputs additionally keep their fan-out, the ordered list
//! of inputs they drive.
//!
//! Signals are addressed by [`SignalRef`]. The typed wrappers [`InputRef`] and
//! [`OutputRef`] are what the construction API hands out, so a connection can
//! only be made from a source to a sink.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{BlockId, Level};

/// Which face of a block a port sits on.
///
/// Compound blocks mirror every external port on the inside: each external
/// input has an internal output driving the contained network, and each
/// external output has an internal input collecting its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    External,
    Internal,
}

/// Whether a signal receives (input) or drives (output) values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

/// Address of any signal in a circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalRef {
    /// Block owning the signal
    pub block: BlockId,
    /// External port or internal mirror
    pub side: Side,
    /// Input or output
    pub direction: Direction,
    /// Position within the block's port list
    pub index: usize,
}

impl SignalRef {
    /// Returns true if this signal drives a fan-out list.
    pub fn is_source(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Returns true if this signal receives values from a fan-out list.
    pub fn is_sink(&self) -> bool {
        self.direction == Direction::Input
    }
}

/// Typed address of a signal that receives values.
///
/// Either an external input of a block or the internal mirror of a compound
/// block's external output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRef(pub(crate) SignalRef);

impl InputRef {
    pub(crate) fn new(block: BlockId, side: Side, index: usize) -> Self {
        Self(SignalRef {
            block,
            side,
            direction: Direction::Input,
            index,
        })
    }

    /// Block that owns this input.
    pub fn block(&self) -> BlockId {
        self.0.block
    }

    /// Returns the untyped address.
    pub fn signal(&self) -> SignalRef {
        self.0
    }
}

/// Typed address of a signal that drives values.
///
/// Either an external output of a block or the internal mirror of a compound
/// block's external input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRef(pub(crate) SignalRef);

impl OutputRef {
    pub(crate) fn new(block: BlockId, side: Side, index: usize) -> Self {
        Self(SignalRef {
            block,
            side,
            direction: Direction::Output,
            index,
        })
    }

    /// Block that owns this output.
    pub fn block(&self) -> BlockId {
        self.0.block
    }

    /// Returns the untyped address.
    pub fn signal(&self) -> SignalRef {
        self.0
    }
}

impl From<InputRef> for SignalRef {
    fn from(r: InputRef) -> Self {
        r.0
    }
}

impl From<OutputRef> for SignalRef {
    fn from(r: OutputRef) -> Self {
        r.0
    }
}

impl TryFrom<SignalRef> for InputRef {
    type Error = SignalRef;

    fn try_from(r: SignalRef) -> Result<Self, Self::Error> {
        if r.is_sink() {
            Ok(InputRef(r))
        } else {
            Err(r)
        }
    }
}

impl TryFrom<SignalRef> for OutputRef {
    type Error = SignalRef;

    fn try_from(r: SignalRef) -> Result<Self, Self::Error> {
        if r.is_source() {
            Ok(OutputRef(r))
        } else {
            Err(r)
        }
    }
}

/// An input port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    name: String,
    level: Level,
}

impl Input {
    /// Creates a new input at [`Level::Zero`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::Zero,
        }
    }

    /// Port name, unique within its block.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current level.
    pub fn get(&self) -> Level {
        self.level
    }

    /// Stores a new level.
    pub fn set(&mut self, level: Level) {
        self.level = level;
    }
}

/// An output port and its fan-out.
///
/// The fan-out keeps connection order. Connecting the same input twice is
/// allowed and simply writes it twice on propagation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    name: String,
    level: Level,
    fan_out: Vec<InputRef>,
}

impl Output {
    /// Creates a new output at [`Level::Zero`] with an empty fan-out.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::Zero,
            fan_out: Vec::new(),
        }
    }

    /// Port name, unique within its block.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current level.
    pub fn get(&self) -> Level {
        self.level
    }

    /// Stores a new level without propagating it.
    pub fn set(&mut self, level: Level) {
        self.level = level;
    }

    /// Inputs driven by this output, in connection order.
    pub fn fan_out(&self) -> &[InputRef] {
        &self.fan_out
    }

    /// Appends `input` to the fan-out.
    pub fn connect(&mut self, input: InputRef) {
        self.fan_out.push(input);
    }

    /// Removes the first fan-out entry equal to `input`.
    ///
    /// Returns false if `input` was not connected.
    pub fn disconnect(&mut self, input: InputRef) -> bool {
        match self.fan_out.iter().position(|i| *i == input) {
            Some(pos) => {
                self.fan_out.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(I){}={}", self.name, self.level)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(O){}={}", self.name, self.level)
    }
}

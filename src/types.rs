//! Core type definitions for the simulation engine.
//!
//! This module defines the fundamental types used throughout the engine:
//! block handles and the two-valued signal level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// Handle of a block inside a [`Circuit`](crate::circuit::Circuit).
///
/// Handles are arena indices. Blocks are never removed from a circuit, so a
/// handle stays valid for the lifetime of the circuit that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value carried by a signal.
///
/// Only binary logic is modelled. Every signal starts at [`Level::Zero`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// A binary zero, false or off signal.
    #[default]
    Zero,
    /// A binary one, true or on signal.
    One,
}

impl Level {
    /// Returns true for [`Level::One`].
    pub fn is_one(self) -> bool {
        self == Level::One
    }

    /// Returns true for [`Level::Zero`].
    pub fn is_zero(self) -> bool {
        self == Level::Zero
    }

    /// Returns the level as `'0'` or `'1'`.
    pub fn as_char(self) -> char {
        match self {
            Level::Zero => '0',
            Level::One => '1',
        }
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value {
            Level::One
        } else {
            Level::Zero
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_one()
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Zero => Level::One,
            Level::One => Level::Zero,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

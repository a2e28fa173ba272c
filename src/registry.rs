//! Library of named circuit builders.
//!
//! The registry maps a library name to a function that adds a ready-made
//! compound block to a circuit, enabling netlist configs to instantiate
//! circuits such as latches by name.
//!
//! # Example
//!
//! ```
//! use gatework::registry::BlockRegistry;
//! use gatework::{Circuit, GateKind};
//!
//! let mut registry = BlockRegistry::new();
//! registry.register("inverter", |c: &mut Circuit| c.add_gate(GateKind::Not, 1));
//!
//! let mut circuit = Circuit::new();
//! let block = registry.create("inverter", &mut circuit).unwrap().unwrap();
//! assert_eq!(circuit.block(block).id(), "NOT.0");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::circuit::Circuit;
use crate::error::CircuitResult;
use crate::types::BlockId;

/// Type alias for block builder functions.
pub type BlockFactory = Arc<dyn Fn(&mut Circuit) -> CircuitResult<BlockId> + Send + Sync>;

/// A registry of block builders.
#[derive(Default, Clone)]
pub struct BlockRegistry {
    factories: HashMap<String, BlockFactory>,
}

impl BlockRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a builder under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&mut Circuit) -> CircuitResult<BlockId> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Builds the block registered as `name` into `circuit`.
    ///
    /// # Returns
    /// `None` if the name is not registered, otherwise the builder's result.
    pub fn create(&self, name: &str, circuit: &mut Circuit) -> Option<CircuitResult<BlockId>> {
        self.factories.get(name).map(|f| f(circuit))
    }

    /// Returns true if a builder is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Removes a builder. Returns false if it was not registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("registered", &self.names())
            .finish()
    }
}

/// Creates a registry with the built-in circuits.
///
/// Includes:
/// - `rs_flip_flop` - [`factory::rs_flip_flop`](crate::factory::rs_flip_flop)
/// - `xor` - [`factory::xor`](crate::factory::xor)
/// - `half_adder` - [`factory::half_adder`](crate::factory::half_adder)
pub fn create_default_registry() -> BlockRegistry {
    use crate::factory;

    let mut registry = BlockRegistry::new();
    registry.register("rs_flip_flop", factory::rs_flip_flop);
    registry.register("xor", factory::xor);
    registry.register("half_adder", factory::half_adder);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;

    #[test]
    fn test_registry_basic() {
        let mut registry = BlockRegistry::new();
        assert!(registry.is_empty());

        registry.register("and3", |c: &mut Circuit| c.add_gate(GateKind::And, 3));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("and3"));

        let mut circuit = Circuit::new();
        let block = registry.create("and3", &mut circuit).unwrap().unwrap();
        assert_eq!(circuit.block(block).inputs().len(), 3);
        assert!(registry.create("missing", &mut circuit).is_none());
    }

    #[test]
    fn test_builder_errors_are_returned() {
        let mut registry = BlockRegistry::new();
        registry.register("bad", |c: &mut Circuit| c.add_gate(GateKind::Not, 3));

        let mut circuit = Circuit::new();
        let result = registry.create("bad", &mut circuit).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_default_registry() {
        let registry = create_default_registry();
        assert_eq!(registry.names(), vec!["half_adder", "rs_flip_flop", "xor"]);

        let mut circuit = Circuit::new();
        let ff = registry.create("rs_flip_flop", &mut circuit).unwrap().unwrap();
        assert_eq!(circuit.block(ff).id(), "RS-FF.0");
    }

    #[test]
    fn test_registry_unregister() {
        let mut registry = create_default_registry();
        assert!(registry.unregister("xor"));
        assert!(!registry.contains("xor"));
        assert!(!registry.unregister("xor"));
    }
}

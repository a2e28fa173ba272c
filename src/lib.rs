//! # Gatework
//!
//! A block-based digital logic simulator. Circuits are built from primitive
//! gates (AND, OR, NOT, NAND, NOR) and hierarchical compound blocks, and are
//! simulated pass by pass.
//!
//! ## Model
//!
//! - A [`Circuit`] owns every block in an arena and hands out [`BlockId`]
//!   handles. Blocks carry a unique string id such as `AND.0` or `RS-FF.1`.
//! - Every block has fixed named inputs and outputs. An output keeps an
//!   ordered fan-out of the inputs it drives.
//! - A compound block mirrors each external port on the inside so that a
//!   sub-network can be attached to it.
//!
//! ## Simulation
//!
//! One pass is [`Circuit::evaluate`] followed by [`Circuit::unevaluate`]
//! ([`Circuit::step`]). Evaluation runs depth-first along the fan-out and
//! never evaluates a block twice in a pass, which is what lets feedback
//! circuits such as latches terminate. Networks with reconvergent paths may
//! need several passes; [`Circuit::settle`] repeats passes until nothing
//! changes.
//!
//! ## Features
//!
//! - `parallel` - Compute truth-table rows using rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use gatework::{factory, Circuit, Level};
//!
//! let mut circuit = Circuit::new();
//! let latch = factory::rs_flip_flop(&mut circuit).unwrap();
//!
//! circuit.set_input(latch, "S", Level::One).unwrap();
//! circuit.step(latch);
//! assert_eq!(circuit.output_level(latch, "Q").unwrap(), Level::One);
//!
//! circuit.set_input(latch, "S", Level::Zero).unwrap();
//! circuit.step(latch);
//! assert_eq!(circuit.output_level(latch, "Q").unwrap(), Level::One);
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use gatework::{create_default_registry, SimConfig};
//!
//! let config = SimConfig::from_file("netlist.yaml")?;
//! gatework::init_logging(&config.simulation.log_level);
//! let (mut circuit, top) = config.build(&create_default_registry())?;
//! circuit.settle(top, config.simulation.settle_limit)?;
//! ```

pub mod types;
pub mod error;
pub mod gate;
pub mod signal;
pub mod block;
pub mod ids;
pub mod circuit;
pub mod engine;
pub mod factory;
pub mod registry;
pub mod truth_table;
pub mod config;
pub mod stats;

// Re-export commonly used types
pub use types::{BlockId, Level};
pub use error::{CircuitError, CircuitResult};
pub use gate::GateKind;
pub use signal::{Direction, Input, InputRef, Output, OutputRef, Side, SignalRef};
pub use block::{Block, BlockKind, GATE_OUTPUT};
pub use ids::IdAllocator;
pub use circuit::{Circuit, Connector};
pub use registry::{create_default_registry, BlockFactory, BlockRegistry};
pub use truth_table::{TruthRow, TruthTable};
pub use config::{
    BlockConfig, ConfigError, NetlistConfig, SignalConfig, SimConfig, SimConfigBuilder,
    SimulationParams,
};
pub use stats::EvalStats;

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging. `RUST_LOG`
/// overrides `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// gatework::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

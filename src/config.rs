//! Configuration and netlist loading.
//!
//! This module provides YAML/JSON configuration file support for describing
//! a circuit declaratively and the simulation parameters used to drive it.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   log_level: info
//!   settle_limit: 16
//!
//! circuit:
//!   id: top
//!   inputs: [a, b]
//!   outputs: [y]
//!   blocks:
//!     - kind: gate
//!       id: nand
//!       type: nand
//!       inputs: 2
//!     - kind: library
//!       name: rs_flip_flop
//!   signals:
//!     - from: top_a
//!       to: nand_1
//!     - from: top_b
//!       to: nand_2
//!     - from: nand_1
//!       to: top_y
//! ```
//!
//! Signal addresses are `blockId_portName`, split at the first `_`. On the
//! `from` side a compound resolves to the internal mirror of its input when
//! the port names one of its inputs, otherwise to its output. On the `to` side
//! a compound resolves to the internal mirror of its output when the port
//! names one of its outputs, otherwise to its input. Gates resolve to their
//! output and inputs directly.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::block::Block;
use crate::circuit::Circuit;
use crate::error::CircuitError;
use crate::gate::GateKind;
use crate::registry::BlockRegistry;
use crate::signal::{InputRef, OutputRef};
use crate::types::BlockId;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("Circuit error: {0}")]
    Circuit(#[from] CircuitError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Global simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum passes `settle` runs before giving up
    #[serde(default = "default_settle_limit")]
    pub settle_limit: usize,

    /// Whether built circuits accumulate per-block counters; passes are
    /// always counted
    #[serde(default)]
    pub collect_stats: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_settle_limit() -> usize {
    16
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            settle_limit: default_settle_limit(),
            collect_stats: false,
        }
    }
}

/// One entry of a compound block's body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlockConfig {
    /// A primitive gate.
    Gate {
        /// Explicit id; generated from the gate kind when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(rename = "type")]
        gate: GateKind,
        /// Input count; 1 for NOT and 2 otherwise when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inputs: Option<usize>,
    },
    /// A nested compound block with its own body.
    Compound(NetlistConfig),
    /// A ready-made circuit from the [`BlockRegistry`]. Its id is generated
    /// by the builder, e.g. `RS-FF.0`.
    Library { name: String },
}

impl BlockConfig {
    /// Creates a gate entry with an explicit id.
    pub fn gate(id: impl Into<String>, gate: GateKind, inputs: usize) -> Self {
        BlockConfig::Gate {
            id: Some(id.into()),
            gate,
            inputs: Some(inputs),
        }
    }

    /// Creates a library entry.
    pub fn library(name: impl Into<String>) -> Self {
        BlockConfig::Library { name: name.into() }
    }
}

/// A connection between two `blockId_portName` addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub from: String,
    pub to: String,
}

/// A compound block: ports, body and wiring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetlistConfig {
    /// Unique block id
    pub id: String,

    /// Ordered input port names
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Ordered output port names
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Contained blocks
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,

    /// Connections, resolved against the whole circuit
    #[serde(default)]
    pub signals: Vec<SignalConfig>,
}

impl NetlistConfig {
    /// Creates an empty compound description.
    pub fn new<I, O>(id: impl Into<String>, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            id: id.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
            blocks: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Adds a block to the body.
    pub fn with_block(mut self, block: BlockConfig) -> Self {
        self.blocks.push(block);
        self
    }

    /// Adds a connection.
    pub fn with_signal(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.signals.push(SignalConfig {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Checks block ids, gate arities, port names and signal addresses.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut ids = HashSet::new();
        self.validate_into(&mut ids)
    }

    fn validate_into<'a>(&'a self, ids: &mut HashSet<&'a str>) -> ConfigResult<()> {
        if !ids.insert(self.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate block ID: {}",
                self.id
            )));
        }
        Block::compound(&self.id, &self.inputs, &self.outputs)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        for block in &self.blocks {
            match block {
                BlockConfig::Gate { id, gate, inputs } => {
                    gate.validate_arity(gate_inputs(*gate, *inputs))
                        .map_err(|e| ConfigError::Validation(e.to_string()))?;
                    if let Some(id) = id {
                        if !ids.insert(id.as_str()) {
                            return Err(ConfigError::Validation(format!(
                                "Duplicate block ID: {}",
                                id
                            )));
                        }
                    }
                }
                BlockConfig::Compound(inner) => inner.validate_into(ids)?,
                BlockConfig::Library { name } => {
                    if name.is_empty() {
                        return Err(ConfigError::Validation(
                            "Library block with empty name".to_string(),
                        ));
                    }
                }
            }
        }

        for signal in &self.signals {
            parse_address(&signal.from)?;
            parse_address(&signal.to)?;
        }
        Ok(())
    }

    /// Builds this compound and everything inside it into a new circuit.
    ///
    /// Returns the circuit and the handle of the top block.
    pub fn build(&self, registry: &BlockRegistry) -> ConfigResult<(Circuit, BlockId)> {
        let mut circuit = Circuit::new();
        let top = self.build_into(&mut circuit, registry)?;
        Ok((circuit, top))
    }

    /// Builds this compound into an existing circuit.
    pub fn build_into(&self, circuit: &mut Circuit, registry: &BlockRegistry) -> ConfigResult<BlockId> {
        self.validate()?;

        let mut signals = Vec::new();
        let top = self.add_blocks(circuit, registry, &mut signals)?;

        let mut drivers: HashMap<InputRef, Vec<&str>> = HashMap::new();
        for signal in &signals {
            let from = resolve_from(circuit, &signal.from)?;
            let to = resolve_to(circuit, &signal.to)?;
            circuit.connect(from, to);
            drivers.entry(to).or_default().push(signal.from.as_str());
        }

        for (input, sources) in &drivers {
            if sources.len() > 1 {
                tracing::warn!(
                    input = %circuit.address(*input),
                    drivers = ?sources,
                    "input driven by more than one output, last propagation wins"
                );
            }
        }

        tracing::info!(
            top = %self.id,
            blocks = circuit.len(),
            signals = signals.len(),
            "netlist built"
        );
        Ok(top)
    }

    fn add_blocks<'a>(
        &'a self,
        circuit: &mut Circuit,
        registry: &BlockRegistry,
        signals: &mut Vec<&'a SignalConfig>,
    ) -> ConfigResult<BlockId> {
        let handle = circuit.add_compound_named(&self.id, &self.inputs, &self.outputs)?;

        for block in &self.blocks {
            match block {
                BlockConfig::Gate { id, gate, inputs } => {
                    let inputs = gate_inputs(*gate, *inputs);
                    match id {
                        Some(id) => circuit.add_gate_with_id(id, *gate, inputs)?,
                        None => circuit.add_gate(*gate, inputs)?,
                    };
                }
                BlockConfig::Compound(inner) => {
                    inner.add_blocks(circuit, registry, signals)?;
                }
                BlockConfig::Library { name } => {
                    let built = registry.create(name, circuit).ok_or_else(|| {
                        ConfigError::Validation(format!("Unknown library block: {}", name))
                    })??;
                    tracing::debug!(library = %name, id = circuit.block(built).id(), "library block added");
                }
            }
        }

        signals.extend(self.signals.iter());
        Ok(handle)
    }
}

fn gate_inputs(gate: GateKind, inputs: Option<usize>) -> usize {
    inputs.unwrap_or(match gate {
        GateKind::Not => 1,
        _ => 2,
    })
}

/// Splits `blockId_portName` at the first `_`.
pub fn parse_address(address: &str) -> ConfigResult<(&str, &str)> {
    match address.split_once('_') {
        Some((block, port)) if !block.is_empty() && !port.is_empty() => Ok((block, port)),
        _ => Err(ConfigError::Validation(format!(
            "Malformed signal address '{}', expected blockId_portName",
            address
        ))),
    }
}

fn resolve_from(circuit: &Circuit, address: &str) -> ConfigResult<OutputRef> {
    let (id, port) = parse_address(address)?;
    let block = circuit.block_by_id(id)?;
    let b = circuit.block(block);
    if b.is_compound() && b.input_index(port).is_some() {
        Ok(circuit.internal_input(block, port)?)
    } else {
        Ok(circuit.output(block, port)?)
    }
}

fn resolve_to(circuit: &Circuit, address: &str) -> ConfigResult<InputRef> {
    let (id, port) = parse_address(address)?;
    let block = circuit.block_by_id(id)?;
    let b = circuit.block(block);
    if b.is_compound() && b.output_index(port).is_some() {
        Ok(circuit.internal_output(block, port)?)
    } else {
        Ok(circuit.input(block, port)?)
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Global simulation parameters
    #[serde(default)]
    pub simulation: SimulationParams,

    /// Top-level circuit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit: Option<NetlistConfig>,
}

impl SimConfig {
    /// Creates a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.simulation.settle_limit == 0 {
            return Err(ConfigError::Validation(
                "settle_limit must be at least 1".to_string(),
            ));
        }
        if let Some(circuit) = &self.circuit {
            circuit.validate()?;
        }
        Ok(())
    }

    /// Builds the configured circuit.
    pub fn build(&self, registry: &BlockRegistry) -> ConfigResult<(Circuit, BlockId)> {
        let netlist = self
            .circuit
            .as_ref()
            .ok_or_else(|| ConfigError::Validation("No circuit configured".to_string()))?;
        let (mut circuit, top) = netlist.build(registry)?;
        circuit.set_collect_stats(self.simulation.collect_stats);
        Ok((circuit, top))
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating SimConfig programmatically.
#[derive(Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Sets the maximum number of settle passes.
    pub fn settle_limit(mut self, limit: usize) -> Self {
        self.config.simulation.settle_limit = limit;
        self
    }

    /// Enables statistics collection.
    pub fn collect_stats(mut self, enable: bool) -> Self {
        self.config.simulation.collect_stats = enable;
        self
    }

    /// Sets the top-level circuit.
    pub fn circuit(mut self, netlist: NetlistConfig) -> Self {
        self.config.circuit = Some(netlist);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<SimConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

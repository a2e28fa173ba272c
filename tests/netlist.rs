//! Integration tests for configuration-driven circuits.
//!
//! These tests verify:
//! - Loading YAML and JSON netlists from strings and files
//! - Library blocks from the default registry
//! - Truth tables of configured circuits

use gatework::{
    create_default_registry, BlockConfig, ConfigError, GateKind, Level, NetlistConfig, SimConfig,
    SimConfigBuilder, TruthTable,
};

const LATCH_YAML: &str = r#"
simulation:
  settle_limit: 4

circuit:
  id: board
  inputs: [set, reset]
  outputs: [q, nq]
  blocks:
    - kind: library
      name: rs_flip_flop
  signals:
    - from: board_set
      to: RS-FF.0_S
    - from: board_reset
      to: RS-FF.0_R
    - from: RS-FF.0_Q
      to: board_q
    - from: RS-FF.0_~Q
      to: board_nq
"#;

#[test]
fn test_latch_from_yaml() {
    let config = SimConfig::from_yaml(LATCH_YAML).unwrap();
    let (mut circuit, board) = config.build(&create_default_registry()).unwrap();
    assert_eq!(circuit.block(board).id(), "board");
    assert_eq!(circuit.len(), 4);

    let steps = [
        ((Level::One, Level::Zero), (Level::One, Level::Zero)),
        ((Level::Zero, Level::Zero), (Level::One, Level::Zero)),
        ((Level::Zero, Level::One), (Level::Zero, Level::One)),
        ((Level::Zero, Level::Zero), (Level::Zero, Level::One)),
    ];
    for ((set, reset), (q, nq)) in steps {
        circuit.set_inputs(board, &[set, reset]);
        circuit.step(board);
        assert_eq!(circuit.output_levels(board), vec![q, nq]);
    }
}

#[test]
fn test_half_adder_truth_table_from_json() {
    let json = r#"{
        "simulation": {"settle_limit": 8},
        "circuit": {
            "id": "adder",
            "inputs": ["x", "y"],
            "outputs": ["s", "c"],
            "blocks": [{"kind": "library", "name": "half_adder"}],
            "signals": [
                {"from": "adder_x", "to": "HA.0_A"},
                {"from": "adder_y", "to": "HA.0_B"},
                {"from": "HA.0_SUM", "to": "adder_s"},
                {"from": "HA.0_CARRY", "to": "adder_c"}
            ]
        }
    }"#;

    let config = SimConfig::from_json(json).unwrap();
    let (circuit, adder) = config.build(&create_default_registry()).unwrap();
    let table = TruthTable::generate(&circuit, adder, config.simulation.settle_limit).unwrap();

    let csv = table.to_csv();
    assert_eq!(csv, "x,y,s,c\n0,0,0,0\n0,1,1,0\n1,0,1,0\n1,1,0,1\n");
}

#[test]
fn test_file_roundtrip() {
    let netlist = NetlistConfig::new("top", ["a", "b"], ["y"])
        .with_block(BlockConfig::gate("nor", GateKind::Nor, 2))
        .with_signal("top_a", "nor_1")
        .with_signal("top_b", "nor_2")
        .with_signal("nor_1", "top_y");
    let config = SimConfigBuilder::new()
        .settle_limit(4)
        .circuit(netlist)
        .build()
        .unwrap();

    let dir = std::env::temp_dir();
    let yaml_path = dir.join(format!("gatework-{}.yaml", std::process::id()));
    let json_path = dir.join(format!("gatework-{}.json", std::process::id()));

    config.to_yaml_file(&yaml_path).unwrap();
    config.to_json_file(&json_path).unwrap();
    let from_yaml = SimConfig::from_file(&yaml_path).unwrap();
    let from_json = SimConfig::from_file(&json_path).unwrap();
    std::fs::remove_file(&yaml_path).ok();
    std::fs::remove_file(&json_path).ok();

    assert_eq!(from_yaml, config);
    assert_eq!(from_json, config);

    let (mut circuit, top) = from_yaml.build(&create_default_registry()).unwrap();
    circuit.settle(top, 4).unwrap();
    assert_eq!(circuit.output_level(top, "y").unwrap(), Level::One);
}

#[test]
fn test_missing_file() {
    let result = SimConfig::from_file("/nonexistent/gatework/netlist.yaml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_invalid_yaml() {
    let result = SimConfig::from_yaml("circuit: [not, a, netlist]");
    assert!(matches!(result, Err(ConfigError::Yaml(_))));
}

#[test]
fn test_unknown_gate_output() {
    let netlist = NetlistConfig::new("top", ["a"], ["y"])
        .with_block(BlockConfig::gate("g", GateKind::Not, 1))
        // Gates have a single output named 1.
        .with_signal("top_a", "g_1")
        .with_signal("g_2", "top_y");
    assert!(netlist.build(&create_default_registry()).is_err());
}

#[test]
fn test_two_drivers_are_accepted() {
    let netlist = NetlistConfig::new("top", ["a", "b"], ["y"])
        .with_block(BlockConfig::gate("g", GateKind::Not, 1))
        .with_signal("top_a", "g_1")
        .with_signal("top_b", "g_1")
        .with_signal("g_1", "top_y");
    let (mut circuit, top) = netlist.build(&create_default_registry()).unwrap();

    // The later source in fan-out order wins.
    circuit.set_inputs(top, &[Level::One, Level::Zero]);
    circuit.step(top);
    assert_eq!(circuit.output_level(top, "y").unwrap(), Level::One);
}

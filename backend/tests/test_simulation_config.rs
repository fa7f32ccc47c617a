//! Tests for configuration loading, validation and the registry seam

use orbital_relay_sim::geometry::{Angle, RADIUS_OF_JUPITER};
use orbital_relay_sim::models::{DeviceKind, Node, NodeKind, SatelliteKind, StoreError};
use orbital_relay_sim::orchestrator::{
    FileConfig, NodeConfig, Simulation, SimulationConfig, SimulationError,
};

const CONFIG: &str = r#"{
    "nodes": [
        { "type": "device", "id": "DeviceA", "kind": "Handheld", "position": 30.0, "mobile": true },
        { "type": "device", "id": "DeviceB", "kind": "Desktop", "position": -20.0 },
        { "type": "satellite", "id": "Sat1", "kind": "Standard", "height": 80000.0, "position": 10.0 },
        { "type": "satellite", "id": "Relay1", "kind": "Relay", "height": 90000.0, "position": 160.0 }
    ],
    "files": [
        { "node_id": "DeviceA", "name": "notes.txt", "content": "jupiter" },
        { "node_id": "Sat1", "name": "cache", "content": "abc" }
    ]
}"#;

fn satellite_config(id: &str, height: f64) -> NodeConfig {
    NodeConfig::Satellite {
        id: id.to_string(),
        kind: SatelliteKind::Teleporting,
        height,
        position: 0.0,
    }
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_from_json() {
    let config = SimulationConfig::from_json(CONFIG).unwrap();
    assert_eq!(config.nodes.len(), 4);

    let sim = Simulation::from_config(&config).unwrap();

    assert_eq!(sim.state().num_nodes(), 4);
    assert_eq!(
        sim.node("DeviceB").unwrap().kind(),
        NodeKind::Device(DeviceKind::Desktop)
    );
    assert!((sim.node("DeviceB").unwrap().position().degrees() - 340.0).abs() < 1e-9);
    assert!(sim.node("DeviceA").unwrap().linear_speed() > 0.0);
    assert_eq!(sim.node("DeviceB").unwrap().linear_speed(), 0.0);
    assert_eq!(sim.file_snapshot("DeviceA").unwrap()["notes.txt"].content, "jupiter");
    assert_eq!(sim.event_log().events_of_type("NodeAdded").len(), 4);
    assert_eq!(sim.current_tick(), 0);
}

#[test]
fn test_empty_document_is_empty_simulation() {
    let config = SimulationConfig::from_json("{}").unwrap();
    let sim = Simulation::from_config(&config).unwrap();
    assert_eq!(sim.state().num_nodes(), 0);
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        SimulationConfig::from_json("{ \"nodes\": [ { \"type\": \"blimp\" } ] }"),
        Err(SimulationError::Json(_))
    ));
}

#[test]
fn test_config_serializes_back() {
    let config = SimulationConfig::from_json(CONFIG).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(SimulationConfig::from_json(&json).unwrap(), config);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_rejects_satellite_inside_body() {
    let config = SimulationConfig {
        nodes: vec![satellite_config("Low", 60_000.0)],
        files: vec![],
    };
    assert!(matches!(
        Simulation::from_config(&config),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_rejects_non_finite_position() {
    let config = SimulationConfig {
        nodes: vec![NodeConfig::Device {
            id: "D".to_string(),
            kind: DeviceKind::Laptop,
            position: f64::NAN,
            mobile: false,
        }],
        files: vec![],
    };
    assert!(matches!(
        Simulation::from_config(&config),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_rejects_empty_and_duplicate_ids() {
    let empty = SimulationConfig {
        nodes: vec![satellite_config("", 80_000.0)],
        files: vec![],
    };
    assert!(matches!(
        Simulation::from_config(&empty),
        Err(SimulationError::InvalidConfig(_))
    ));

    let duplicate = SimulationConfig {
        nodes: vec![satellite_config("S", 80_000.0), satellite_config("S", 90_000.0)],
        files: vec![],
    };
    assert!(matches!(
        Simulation::from_config(&duplicate),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_rejects_bad_file_placement() {
    let unknown = SimulationConfig {
        nodes: vec![satellite_config("S", 80_000.0)],
        files: vec![FileConfig {
            node_id: "Nowhere".to_string(),
            name: "f".to_string(),
            content: "x".to_string(),
        }],
    };
    assert!(matches!(
        Simulation::from_config(&unknown),
        Err(SimulationError::InvalidConfig(_))
    ));

    let file = FileConfig {
        node_id: "S".to_string(),
        name: "f".to_string(),
        content: "x".to_string(),
    };
    let duplicate = SimulationConfig {
        nodes: vec![satellite_config("S", 80_000.0)],
        files: vec![file.clone(), file],
    };
    assert!(matches!(
        Simulation::from_config(&duplicate),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_seeded_file_must_fit_store() {
    let config = SimulationConfig {
        nodes: vec![NodeConfig::Satellite {
            id: "S".to_string(),
            kind: SatelliteKind::Standard,
            height: 80_000.0,
            position: 0.0,
        }],
        files: vec![FileConfig {
            node_id: "S".to_string(),
            name: "huge".to_string(),
            content: "x".repeat(81),
        }],
    };
    assert!(matches!(
        Simulation::from_config(&config),
        Err(SimulationError::Store(StoreError::OutOfSpace { .. }))
    ));
}

// ============================================================================
// Registry seam
// ============================================================================

#[test]
fn test_add_node_rejects_duplicate() {
    let mut sim = Simulation::new();
    let node = Node::device("D", DeviceKind::Laptop, Angle::from_degrees(0.0), false);
    sim.add_node(node.clone()).unwrap();
    assert!(matches!(
        sim.add_node(node),
        Err(SimulationError::DuplicateNode(id)) if id == "D"
    ));
}

#[test]
fn test_add_node_rejects_satellite_off_orbit() {
    let mut sim = Simulation::new();
    for height in [0.0, -80_000.0, 50_000.0, f64::NAN, f64::INFINITY] {
        let node = Node::satellite("Z", SatelliteKind::Standard, height, Angle::from_degrees(10.0));
        assert!(
            matches!(sim.add_node(node), Err(SimulationError::InvalidConfig(_))),
            "height {height} accepted"
        );
    }
    assert!(sim.node("Z").is_none());
    assert!(sim.event_log().is_empty());

    // A rejected node never reaches the tick loop
    sim.advance_one_minute();
    assert_eq!(sim.state().num_nodes(), 0);
}

#[test]
fn test_add_node_rejects_non_finite_position() {
    let mut sim = Simulation::new();
    let node = Node::device("D", DeviceKind::Laptop, Angle::from_degrees(f64::NAN), false);
    assert!(matches!(
        sim.add_node(node),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_add_node_accepts_orbit_just_above_surface() {
    let mut sim = Simulation::new();
    let node = Node::satellite(
        "Low",
        SatelliteKind::Teleporting,
        RADIUS_OF_JUPITER + 1.0,
        Angle::from_degrees(10.0),
    );
    sim.add_node(node).unwrap();

    sim.simulate(10);
    let degrees = sim.node("Low").unwrap().position().degrees();
    assert!((0.0..360.0).contains(&degrees));
}

#[test]
fn test_add_file_errors() {
    let mut sim = Simulation::new();
    sim.add_node(Node::satellite(
        "R",
        SatelliteKind::Relay,
        80_000.0,
        Angle::from_degrees(150.0),
    ))
    .unwrap();

    assert!(matches!(
        sim.add_file("R", "f", "x"),
        Err(SimulationError::NoFileStore(_))
    ));
    assert!(matches!(
        sim.add_file("ghost", "f", "x"),
        Err(SimulationError::NodeNotFound(_))
    ));
}

#[test]
fn test_remove_node_logs_event() {
    let config = SimulationConfig::from_json(CONFIG).unwrap();
    let mut sim = Simulation::from_config(&config).unwrap();

    let removed = sim.remove_node("Relay1").unwrap();
    assert!(removed.is_relay());
    assert!(sim.node("Relay1").is_none());
    assert_eq!(sim.event_log().events_of_type("NodeRemoved").len(), 1);
}

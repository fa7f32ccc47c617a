//! Tests for relay-extended reachability

use orbital_relay_sim::geometry::Angle;
use orbital_relay_sim::models::{DeviceKind, Node, SatelliteKind, SimulationState};
use orbital_relay_sim::reachability::{can_reach, direct_link, reachable_from};
use std::collections::BTreeSet;

const HEIGHT: f64 = 80_000.0;

// ============================================================================
// Test Helpers
// ============================================================================

fn device(id: &str, kind: DeviceKind, position: f64) -> Node {
    Node::device(id, kind, Angle::from_degrees(position), false)
}

fn satellite(id: &str, kind: SatelliteKind, position: f64) -> Node {
    Node::satellite(id, kind, HEIGHT, Angle::from_degrees(position))
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

// ============================================================================
// Direct edges
// ============================================================================

#[test]
fn test_device_range_limits_device_but_not_satellite() {
    // ~70 900 km apart: inside the satellite's 150 000 km, outside the handheld's 50 000 km
    let state = SimulationState::new(vec![
        device("DeviceB", DeviceKind::Handheld, 174.0),
        Node::satellite("Satellite1", SatelliteKind::Standard, 129_770.0, Angle::from_degrees(151.0)),
    ]);

    assert_eq!(reachable_from(&state, "Satellite1"), set(&["DeviceB"]));
    assert!(reachable_from(&state, "DeviceB").is_empty());
}

#[test]
fn test_standard_satellite_refuses_desktop_both_ways() {
    let desktop = device("D", DeviceKind::Desktop, 0.0);
    let standard = satellite("S", SatelliteKind::Standard, 0.0);
    let teleporting = satellite("T", SatelliteKind::Teleporting, 0.0);

    assert!(!direct_link(&desktop, &standard));
    assert!(!direct_link(&standard, &desktop));
    assert!(direct_link(&desktop, &teleporting));
    assert!(direct_link(&teleporting, &desktop));
}

#[test]
fn test_symmetric_between_like_satellites() {
    let a = satellite("A", SatelliteKind::Teleporting, 10.0);
    let b = satellite("B", SatelliteKind::Teleporting, 55.0);
    let c = satellite("C", SatelliteKind::Teleporting, 80.0);

    assert!(direct_link(&a, &b) && direct_link(&b, &a));
    assert!(!direct_link(&a, &c) && !direct_link(&c, &a));
}

#[test]
fn test_beyond_horizon_is_unreachable() {
    let state = SimulationState::new(vec![
        device("D", DeviceKind::Laptop, 0.0),
        satellite("S", SatelliteKind::Standard, 35.0),
    ]);
    assert!(!can_reach(&state, "D", "S"));
    assert!(!can_reach(&state, "S", "D"));
}

// ============================================================================
// Relay extension
// ============================================================================

#[test]
fn test_devices_see_each_other_through_relay() {
    let state = SimulationState::new(vec![
        device("A", DeviceKind::Handheld, 0.0),
        device("B", DeviceKind::Handheld, 40.0),
        satellite("R", SatelliteKind::Relay, 20.0),
    ]);

    assert_eq!(reachable_from(&state, "A"), set(&["B", "R"]));
    assert_eq!(reachable_from(&state, "B"), set(&["A", "R"]));
}

#[test]
fn test_relay_bridges_satellites_without_line_of_sight() {
    let s1 = satellite("S1", SatelliteKind::Standard, 0.0);
    let s2 = satellite("S2", SatelliteKind::Standard, 100.0);
    assert!(!direct_link(&s1, &s2));

    let state = SimulationState::new(vec![s1, s2, satellite("R", SatelliteKind::Relay, 50.0)]);
    assert!(can_reach(&state, "S1", "S2"));
    assert!(can_reach(&state, "S2", "S1"));
}

#[test]
fn test_relay_does_not_bridge_unsupported_kinds() {
    let state = SimulationState::new(vec![
        device("Desk", DeviceKind::Desktop, 0.0),
        satellite("R", SatelliteKind::Relay, 20.0),
        satellite("S", SatelliteKind::Standard, 50.0),
        satellite("T", SatelliteKind::Teleporting, 48.0),
    ]);

    // Standard satellites refuse desktops even with a relay in between
    assert_eq!(reachable_from(&state, "Desk"), set(&["R", "T"]));
    assert!(!reachable_from(&state, "S").contains("Desk"));
    assert!(reachable_from(&state, "T").contains("Desk"));
}

#[test]
fn test_relay_chain() {
    let state = SimulationState::new(vec![
        device("A", DeviceKind::Handheld, 0.0),
        satellite("R1", SatelliteKind::Relay, 20.0),
        satellite("R2", SatelliteKind::Relay, 70.0),
        device("B", DeviceKind::Handheld, 90.0),
    ]);

    assert_eq!(reachable_from(&state, "A"), set(&["B", "R1", "R2"]));
}

#[test]
fn test_non_relay_does_not_extend() {
    let state = SimulationState::new(vec![
        device("A", DeviceKind::Handheld, 0.0),
        satellite("T", SatelliteKind::Teleporting, 20.0),
        device("B", DeviceKind::Handheld, 40.0),
    ]);

    assert_eq!(reachable_from(&state, "A"), set(&["T"]));
}

#[test]
fn test_relay_ring_terminates_and_excludes_source() {
    let relays: Vec<Node> = (0..8)
        .map(|i| satellite(&format!("R{i}"), SatelliteKind::Relay, i as f64 * 45.0))
        .collect();
    let state = SimulationState::new(relays);

    let reach = reachable_from(&state, "R0");
    assert_eq!(reach.len(), 7);
    assert!(!reach.contains("R0"));
}

#[test]
fn test_reachability_idempotent_without_tick() {
    let state = SimulationState::new(vec![
        device("A", DeviceKind::Handheld, 0.0),
        device("B", DeviceKind::Laptop, 40.0),
        satellite("R", SatelliteKind::Relay, 20.0),
        satellite("S", SatelliteKind::Standard, 10.0),
    ]);

    assert_eq!(reachable_from(&state, "A"), reachable_from(&state, "A"));
    assert_eq!(reachable_from(&state, "S"), reachable_from(&state, "S"));
}

#[test]
fn test_unknown_node_reaches_nothing() {
    let state = SimulationState::new(vec![device("A", DeviceKind::Handheld, 0.0)]);
    assert!(reachable_from(&state, "missing").is_empty());
    assert!(!can_reach(&state, "missing", "A"));
}

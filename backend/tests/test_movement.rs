//! Tests for per-minute motion profiles

use orbital_relay_sim::geometry::Angle;
use orbital_relay_sim::models::{DeviceKind, Node, SatelliteKind};
use orbital_relay_sim::movement::Direction;
use orbital_relay_sim::orchestrator::Simulation;

const HEIGHT: f64 = 80_000.0;

/// Degrees per minute at 80 000 km
const STANDARD_STEP: f64 = 1.790_493_109_783_822_6;
const TELEPORT_STEP: f64 = 0.716_197_243_913_529_1;
const RELAY_STEP: f64 = 1.074_295_865_870_293_5;

fn satellite(kind: SatelliteKind, position: f64) -> Node {
    Node::satellite("S", kind, HEIGHT, Angle::from_degrees(position))
}

fn assert_near(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Devices
// ============================================================================

#[test]
fn test_fixed_device_never_moves() {
    let mut device = Node::device("D", DeviceKind::Desktop, Angle::from_degrees(42.0), false);
    for _ in 0..100 {
        device.advance();
    }
    assert_eq!(device.position().degrees(), 42.0);
}

#[test]
fn test_mobile_device_creeps_anticlockwise() {
    let mut device = Node::device("D", DeviceKind::Handheld, Angle::from_degrees(10.0), true);
    device.advance();
    assert_near(device.position().degrees(), 10.0 + 0.040_977_656_958_906_55);
}

// ============================================================================
// Standard satellites
// ============================================================================

#[test]
fn test_standard_satellite_moves_clockwise_and_wraps() {
    let mut sat = satellite(SatelliteKind::Standard, 0.0);
    let step = sat.advance();
    assert!(!step.teleported);
    assert_near(sat.position().degrees(), 360.0 - STANDARD_STEP);
}

// ============================================================================
// Teleporting satellites
// ============================================================================

#[test]
fn test_teleporting_satellite_resets_on_crossing() {
    let mut sat = satellite(SatelliteKind::Teleporting, 179.5);
    let step = sat.advance();

    assert!(step.teleported);
    assert_eq!(sat.position().degrees(), 0.0);
    assert_eq!(sat.motion().direction(), Some(Direction::Clockwise));

    // Next minute heads clockwise from 0 without teleporting again
    let step = sat.advance();
    assert!(!step.teleported);
    assert_near(sat.position().degrees(), 360.0 - TELEPORT_STEP);
}

#[test]
fn test_teleporting_satellite_past_threshold_does_not_teleport_immediately() {
    let mut sat = satellite(SatelliteKind::Teleporting, 200.0);
    let step = sat.advance();
    assert!(!step.teleported);
    assert_near(sat.position().degrees(), 200.0 + TELEPORT_STEP);

    // It has to wrap through 0 before reaching 180 again (~475 minutes)
    let first_teleport = (1..1000).find(|_| sat.advance().teleported).unwrap();
    assert!(first_teleport > 400, "teleported after {first_teleport} minutes");
}

#[test]
fn test_teleporting_satellite_alternates_direction() {
    let mut sat = satellite(SatelliteKind::Teleporting, 179.5);
    assert!(sat.advance().teleported);

    // 180 degrees clockwise at ~0.716 degrees a minute
    let minutes = (1..1000).find(|_| sat.advance().teleported).unwrap();
    assert!((250..=254).contains(&minutes), "second teleport after {minutes} minutes");
    assert_eq!(sat.position().degrees(), 0.0);
    assert_eq!(sat.motion().direction(), Some(Direction::Anticlockwise));
}

// ============================================================================
// Relay satellites
// ============================================================================

#[test]
fn test_relay_below_band_heads_anticlockwise() {
    let mut relay = satellite(SatelliteKind::Relay, 100.0);
    relay.advance();
    assert_near(relay.position().degrees(), 100.0 + RELAY_STEP);
    assert_eq!(relay.motion().direction(), Some(Direction::Anticlockwise));
}

#[test]
fn test_relay_above_band_heads_clockwise() {
    let mut relay = satellite(SatelliteKind::Relay, 300.0);
    relay.advance();
    assert_near(relay.position().degrees(), 300.0 - RELAY_STEP);
}

#[test]
fn test_relay_return_split() {
    let mut at_split = satellite(SatelliteKind::Relay, 345.0);
    at_split.advance();
    assert_eq!(at_split.motion().direction(), Some(Direction::Clockwise));

    let mut past_split = satellite(SatelliteKind::Relay, 346.0);
    past_split.advance();
    assert_eq!(past_split.motion().direction(), Some(Direction::Anticlockwise));
    assert_near(past_split.position().degrees(), 346.0 + RELAY_STEP);
}

#[test]
fn test_relay_inside_band_starts_clockwise() {
    let mut relay = satellite(SatelliteKind::Relay, 160.0);
    relay.advance();
    assert_near(relay.position().degrees(), 160.0 - RELAY_STEP);
}

#[test]
fn test_relay_bounces_off_lower_edge() {
    let mut relay = satellite(SatelliteKind::Relay, 140.5);

    relay.advance();
    assert_near(relay.position().degrees(), 140.5 - RELAY_STEP);

    relay.advance();
    assert_near(relay.position().degrees(), 140.5);
    assert_eq!(relay.motion().direction(), Some(Direction::Anticlockwise));
}

#[test]
fn test_relay_stays_near_band() {
    let mut relay = satellite(SatelliteKind::Relay, 165.0);
    for _ in 0..2000 {
        relay.advance();
        let degrees = relay.position().degrees();
        assert!(degrees >= 140.0 - RELAY_STEP - 1e-9 && degrees <= 190.0 + RELAY_STEP + 1e-9);
    }
}

// ============================================================================
// Orchestrated movement
// ============================================================================

#[test]
fn test_tick_reports_teleports() {
    let mut sim = Simulation::new();
    sim.add_node(satellite(SatelliteKind::Teleporting, 179.5)).unwrap();

    let result = sim.tick();
    assert_eq!(result.num_teleports, 1);
    let teleports = sim.event_log().events_of_type("Teleported");
    assert_eq!(teleports.len(), 1);
    assert_eq!(teleports[0].node_id(), Some("S"));
    assert_eq!(teleports[0].tick(), 0);

    let result = sim.tick();
    assert_eq!(result.num_teleports, 0);
}

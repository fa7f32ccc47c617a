//! Orbital Relay Simulator Core
//!
//! Time-stepped simulation of satellites and ground devices around Jupiter:
//! line-of-sight visibility, relay-extended reachability and
//! bandwidth-limited file transfers.
//!
//! # Architecture
//!
//! - **core**: Time management
//! - **geometry**: Visibility and distance around the body
//! - **models**: Domain types (Node, FileStore, Bandwidth, State, Event)
//! - **movement**: Per-minute motion profiles
//! - **reachability**: Relay-extended reachability queries
//! - **transfer**: Transfer ledger and its state machine
//! - **orchestrator**: Main simulation loop
//!
//! # Critical Invariants
//!
//! 1. Angular positions always lie in [0°, 360°)
//! 2. Reachability is recomputed per query, never cached across ticks
//! 3. A failed transfer request leaves no reservation or placeholder behind

// Module declarations
pub mod core;
pub mod geometry;
pub mod models;
pub mod movement;
pub mod orchestrator;
pub mod reachability;
pub mod transfer;

// Re-exports for convenience
pub use core::time::TimeManager;
pub use geometry::{Angle, RADIUS_OF_JUPITER};
pub use models::{
    event::{Event, EventLog},
    file::{FileRecord, FileStore, StoreError},
    node::{DeviceKind, Node, NodeKind, SatelliteKind},
    state::SimulationState,
};
pub use orchestrator::{
    FileConfig, FileSnapshot, NodeConfig, Simulation, SimulationConfig, SimulationError, TickResult,
};
pub use transfer::{TransferEntry, TransferError, TransferState};

//! Orchestrator - the simulation facade
//!
//! Owns the node arena, the clock, the transfer ledger and the event log,
//! and runs the per-minute loop.
//!
//! See `engine.rs` for full implementation.

pub mod engine;

// Re-export main types for convenience
pub use engine::{
    FileConfig, FileSnapshot, NodeConfig, Simulation, SimulationConfig, SimulationError, TickResult,
};

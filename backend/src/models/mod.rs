//! Domain models for the orbital relay simulation

pub mod bandwidth;
pub mod event;
pub mod file;
pub mod node;
pub mod state;

// Re-exports
pub use bandwidth::{Bandwidth, BandwidthError, BandwidthProfile, SessionKind};
pub use event::{Event, EventLog};
pub use file::{FileRecord, FileStore, StoreError, StoreLimits, REDACTION_MARKER};
pub use node::{DeviceKind, Node, NodeKind, SatelliteKind};
pub use state::SimulationState;

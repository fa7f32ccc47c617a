//! Orchestrator Engine
//!
//! Main simulation loop integrating all components:
//! - Movement (every node advances one simulated minute)
//! - Teleport detection (wrap-teleport resets this tick)
//! - Transfer ledger (one advance per open transfer)
//! - Event logging (complete simulation history)
//!
//! # Architecture
//!
//! ```text
//! For each tick t:
//! 1. Move every node by its motion profile
//! 2. Record wrap-teleport resets
//! 3. Advance every open transfer (interrupt, abort, negotiate, grow)
//! 4. Drop completed and aborted entries, releasing bandwidth
//! 5. Advance time
//! ```
//!
//! # Example
//!
//! ```rust
//! use orbital_relay_sim::orchestrator::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::from_json(r#"{
//!     "nodes": [
//!         { "type": "device", "id": "DeviceA", "kind": "Laptop", "position": 90.0 },
//!         { "type": "satellite", "id": "Sat1", "kind": "Teleporting", "height": 80000.0, "position": 92.0 }
//!     ],
//!     "files": [
//!         { "node_id": "DeviceA", "name": "hello.txt", "content": "hello" }
//!     ]
//! }"#).unwrap();
//!
//! let mut sim = Simulation::from_config(&config).unwrap();
//! sim.initiate_transfer("hello.txt", "DeviceA", "Sat1").unwrap();
//! sim.advance_one_minute();
//!
//! let files = sim.file_snapshot("Sat1").unwrap();
//! assert!(files["hello.txt"].is_complete);
//! ```

use crate::core::time::TimeManager;
use crate::geometry::{Angle, RADIUS_OF_JUPITER};
use crate::models::{
    event::{Event, EventLog},
    file::{FileRecord, StoreError},
    node::{DeviceKind, Node, SatelliteKind},
    state::SimulationState,
};
use crate::reachability;
use crate::transfer::{TransferEntry, TransferError, TransferLedger};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete simulation configuration
///
/// Loaded from JSON; every field may be omitted for an empty simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Initial nodes
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Complete files seeded onto storing nodes
    #[serde(default)]
    pub files: Vec<FileConfig>,
}

impl SimulationConfig {
    /// Parse a configuration document
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Per-node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeConfig {
    Device {
        id: String,
        kind: DeviceKind,
        /// Degrees; normalized into [0, 360)
        position: f64,
        #[serde(default)]
        mobile: bool,
    },
    Satellite {
        id: String,
        kind: SatelliteKind,
        /// Distance from the body centre in km
        height: f64,
        position: f64,
    },
}

impl NodeConfig {
    pub fn id(&self) -> &str {
        match self {
            NodeConfig::Device { id, .. } | NodeConfig::Satellite { id, .. } => id,
        }
    }

    fn position(&self) -> f64 {
        match self {
            NodeConfig::Device { position, .. } | NodeConfig::Satellite { position, .. } => *position,
        }
    }

    /// Whether this node will hold a file store
    fn stores_files(&self) -> bool {
        !matches!(
            self,
            NodeConfig::Satellite {
                kind: SatelliteKind::Relay,
                ..
            }
        )
    }

    fn build(&self) -> Node {
        match self {
            NodeConfig::Device {
                id,
                kind,
                position,
                mobile,
            } => Node::device(id.clone(), *kind, Angle::from_degrees(*position), *mobile),
            NodeConfig::Satellite {
                id,
                kind,
                height,
                position,
            } => Node::satellite(id.clone(), *kind, *height, Angle::from_degrees(*position)),
        }
    }
}

/// A complete file placed on a node at start-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    pub node_id: String,
    pub name: String,
    pub content: String,
}

// ============================================================================
// Simulation
// ============================================================================

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node ID {0} already exists")]
    DuplicateNode(String),

    #[error("Node {0} cannot store files")]
    NoFileStore(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    /// Tick number
    pub tick: usize,

    /// Nodes that performed a wrap-teleport reset
    pub num_teleports: usize,

    /// Transfers that reached their declared size
    pub num_completed: usize,

    /// Transfers aborted (range loss, source change, removed endpoint)
    pub num_aborted: usize,

    /// Transfers force-completed by a teleport
    pub num_interrupted: usize,

    /// Transfers still open after the tick
    pub active_transfers: usize,
}

/// Read-only view of one stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSnapshot {
    /// Materialized content so far (lossy UTF-8)
    pub content: String,
    pub declared_size: usize,
    pub is_complete: bool,
}

/// The simulation engine
///
/// # Example
///
/// ```rust
/// use orbital_relay_sim::geometry::Angle;
/// use orbital_relay_sim::models::{DeviceKind, Node, SatelliteKind};
/// use orbital_relay_sim::orchestrator::Simulation;
///
/// let mut sim = Simulation::new();
/// sim.add_node(Node::device("A", DeviceKind::Handheld, Angle::from_degrees(0.0), false)).unwrap();
/// sim.add_node(Node::satellite("S", SatelliteKind::Standard, 80_000.0, Angle::from_degrees(1.0))).unwrap();
///
/// assert!(sim.reachable_from("A").contains("S"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    /// Node arena
    state: SimulationState,

    /// Simulated clock
    time_manager: TimeManager,

    /// Open transfers
    ledger: TransferLedger,

    /// Complete event history
    event_log: EventLog,
}

impl Simulation {
    /// Create an empty simulation at minute zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a simulation from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfig` if validation fails
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimulationError> {
        Self::validate_config(config)?;

        let mut sim = Self::new();
        for node_config in &config.nodes {
            sim.add_node(node_config.build())?;
        }
        for file in &config.files {
            sim.add_file(&file.node_id, &file.name, file.content.as_bytes())?;
        }

        log::info!(
            "Simulation configured with {} nodes and {} files",
            config.nodes.len(),
            config.files.len()
        );
        Ok(sim)
    }

    /// Validate configuration
    fn validate_config(config: &SimulationConfig) -> Result<(), SimulationError> {
        let mut storing = HashSet::new();
        let mut ids = HashSet::new();

        for node in &config.nodes {
            let id = node.id();
            if id.is_empty() {
                return Err(SimulationError::InvalidConfig("Node ID must not be empty".to_string()));
            }
            if !ids.insert(id) {
                return Err(SimulationError::InvalidConfig(format!("Duplicate node ID: {}", id)));
            }
            if !node.position().is_finite() {
                return Err(SimulationError::InvalidConfig(format!(
                    "Node {} has a non-finite position",
                    id
                )));
            }
            if let NodeConfig::Satellite { height, .. } = node {
                check_orbit(id, *height)?;
            }
            if node.stores_files() {
                storing.insert(id);
            }
        }

        let mut names = HashSet::new();
        for file in &config.files {
            if !ids.contains(file.node_id.as_str()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "File {} placed on unknown node {}",
                    file.name, file.node_id
                )));
            }
            if !storing.contains(file.node_id.as_str()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "File {} placed on {}, which cannot store files",
                    file.name, file.node_id
                )));
            }
            if !names.insert((file.node_id.as_str(), file.name.as_str())) {
                return Err(SimulationError::InvalidConfig(format!(
                    "Duplicate file {} on {}",
                    file.name, file.node_id
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get current tick number
    pub fn current_tick(&self) -> usize {
        self.time_manager.current_tick()
    }

    pub fn time(&self) -> &TimeManager {
        &self.time_manager
    }

    /// Get reference to simulation state
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.state.get_node(id)
    }

    /// Get reference to event log
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Open transfers, in initiation order
    pub fn transfers(&self) -> &[TransferEntry] {
        self.ledger.entries()
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Add a node to the arena
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a satellite that does not orbit above the surface
    /// or sits at a non-finite position; `DuplicateNode` for a taken ID
    pub fn add_node(&mut self, node: Node) -> Result<(), SimulationError> {
        let id = node.id().to_string();
        let kind = node.kind();
        if !node.is_device() {
            check_orbit(&id, node.height())?;
        }
        if !node.position().degrees().is_finite() {
            return Err(SimulationError::InvalidConfig(format!(
                "Node {} has a non-finite position",
                id
            )));
        }
        if !self.state.insert_node(node) {
            return Err(SimulationError::DuplicateNode(id));
        }

        log::debug!("Added {} {}", kind, id);
        self.event_log.log(Event::NodeAdded {
            tick: self.current_tick(),
            node_id: id,
            kind,
        });
        Ok(())
    }

    /// Remove a node, dropping every transfer that touches it first
    pub fn remove_node(&mut self, id: &str) -> Result<Node, SimulationError> {
        if !self.state.contains(id) {
            return Err(SimulationError::NodeNotFound(id.to_string()));
        }

        let tick = self.current_tick();
        let dropped = self
            .ledger
            .drop_node(&mut self.state, id, tick, &mut self.event_log);
        let node = self
            .state
            .remove_node(id)
            .ok_or_else(|| SimulationError::NodeNotFound(id.to_string()))?;

        log::debug!("Removed {} ({} transfers dropped)", id, dropped);
        self.event_log.log(Event::NodeRemoved {
            tick,
            node_id: id.to_string(),
            dropped_transfers: dropped,
        });
        Ok(node)
    }

    /// Seed a complete file onto a storing node
    pub fn add_file(
        &mut self,
        node_id: &str,
        name: &str,
        content: impl Into<Vec<u8>>,
    ) -> Result<(), SimulationError> {
        let node = self
            .state
            .get_node_mut(node_id)
            .ok_or_else(|| SimulationError::NodeNotFound(node_id.to_string()))?;
        let store = node
            .store_mut()
            .ok_or_else(|| SimulationError::NoFileStore(node_id.to_string()))?;
        store.insert(FileRecord::complete(name, content))?;
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every node the given node can exchange data with this tick
    ///
    /// Unknown IDs yield an empty set.
    pub fn reachable_from(&self, node_id: &str) -> BTreeSet<String> {
        reachability::reachable_from(&self.state, node_id)
    }

    /// Snapshot of a node's store, or `None` for an unknown node
    ///
    /// Nodes without a store (relays) report an empty map.
    pub fn file_snapshot(&self, node_id: &str) -> Option<BTreeMap<String, FileSnapshot>> {
        let node = self.state.get_node(node_id)?;
        let files = node
            .store()
            .map(|store| {
                store
                    .files()
                    .map(|file| {
                        (
                            file.name().to_string(),
                            FileSnapshot {
                                content: file.content_str().into_owned(),
                                declared_size: file.size(),
                                is_complete: file.is_complete(),
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(files)
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Start copying `file_name` from one node to another
    ///
    /// On error nothing is reserved or created.
    pub fn initiate_transfer(&mut self, file_name: &str, from: &str, to: &str) -> Result<(), TransferError> {
        let tick = self.current_tick();
        self.ledger
            .initiate(&mut self.state, file_name, from, to, tick, &mut self.event_log)
            .map(|_| ())
    }

    // ========================================================================
    // Main Tick Loop
    // ========================================================================

    /// Execute one simulation tick (one simulated minute)
    ///
    /// ```rust
    /// use orbital_relay_sim::orchestrator::Simulation;
    ///
    /// let mut sim = Simulation::new();
    /// let result = sim.tick();
    /// assert_eq!(result.tick, 0);
    /// assert_eq!(sim.current_tick(), 1);
    /// ```
    pub fn tick(&mut self) -> TickResult {
        let tick = self.current_tick();

        // STEP 1: MOVEMENT
        let mut teleported = Vec::new();
        for node in self.state.nodes_mut() {
            if node.advance().teleported {
                teleported.push(node.id().to_string());
            }
        }

        // STEP 2: TELEPORTS
        for node_id in &teleported {
            log::debug!("{} teleported to 0 degrees", node_id);
            self.event_log.log(Event::Teleported {
                tick,
                node_id: node_id.clone(),
            });
        }
        let num_teleports = teleported.len();
        let teleported: HashSet<String> = teleported.into_iter().collect();

        // STEP 3: TRANSFERS
        let summary = self
            .ledger
            .advance(&mut self.state, &teleported, tick, &mut self.event_log);

        // STEP 4: ADVANCE TIME
        self.time_manager.advance_tick();

        TickResult {
            tick,
            num_teleports,
            num_completed: summary.completed,
            num_aborted: summary.aborted,
            num_interrupted: summary.interrupted,
            active_transfers: self.ledger.len(),
        }
    }

    /// Run one full simulated minute
    pub fn advance_one_minute(&mut self) {
        self.tick();
    }

    /// Run `minutes` ticks, returning each tick's result
    pub fn simulate(&mut self, minutes: usize) -> Vec<TickResult> {
        (0..minutes).map(|_| self.tick()).collect()
    }
}

/// Satellites need a finite height strictly above the body surface
fn check_orbit(id: &str, height: f64) -> Result<(), SimulationError> {
    if !height.is_finite() || height <= RADIUS_OF_JUPITER {
        return Err(SimulationError::InvalidConfig(format!(
            "Satellite {} must orbit above the surface (height {} <= {})",
            id, height, RADIUS_OF_JUPITER
        )));
    }
    Ok(())
}

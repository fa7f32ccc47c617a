//! Simulation State
//!
//! Arena of all live nodes, keyed by identifier. The reachability graph and
//! the transfer ledger work over borrowed views of this arena and refer to
//! nodes and files by identifier, never by embedded back-references.
//!
//! # Critical Invariants
//!
//! 1. **Identifier uniqueness**: each node ID appears exactly once
//! 2. **Deterministic order**: iteration follows sorted node IDs

use crate::models::node::Node;
use std::collections::BTreeMap;

/// All nodes currently taking part in the simulation
///
/// # Example
///
/// ```rust
/// use orbital_relay_sim::geometry::Angle;
/// use orbital_relay_sim::models::{DeviceKind, Node, SatelliteKind, SimulationState};
///
/// let state = SimulationState::new(vec![
///     Node::device("DeviceA", DeviceKind::Laptop, Angle::from_degrees(90.0), false),
///     Node::satellite("Sat1", SatelliteKind::Standard, 80_000.0, Angle::from_degrees(95.0)),
/// ]);
/// assert_eq!(state.num_nodes(), 2);
/// assert!(state.get_node("Sat1").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    nodes: BTreeMap<String, Node>,
}

impl SimulationState {
    /// Create a state from an initial set of nodes
    ///
    /// # Panics
    ///
    /// Panics if two nodes share an identifier
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut state = Self::default();
        for node in nodes {
            let id = node.id().to_string();
            assert!(state.insert_node(node), "Node ID {} already exists", id);
        }
        state
    }

    /// Insert a node; returns false (and leaves the arena unchanged) on a duplicate ID
    pub fn insert_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(node.id()) {
            return false;
        }
        self.nodes.insert(node.id().to_string(), node);
        true
    }

    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in identifier order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Total bytes held across every store
    pub fn total_bytes_stored(&self) -> usize {
        self.nodes
            .values()
            .filter_map(|node| node.store())
            .map(|store| store.bytes_used())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Angle;
    use crate::models::node::{DeviceKind, SatelliteKind};

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut state = SimulationState::default();
        assert!(state.insert_node(Node::device("A", DeviceKind::Handheld, Angle::default(), false)));
        assert!(!state.insert_node(Node::satellite(
            "A",
            SatelliteKind::Relay,
            80_000.0,
            Angle::default()
        )));
        assert_eq!(state.num_nodes(), 1);
        assert!(state.get_node("A").unwrap().is_device());
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn test_new_panics_on_duplicate_ids() {
        SimulationState::new(vec![
            Node::device("A", DeviceKind::Handheld, Angle::default(), false),
            Node::device("A", DeviceKind::Laptop, Angle::default(), false),
        ]);
    }

    #[test]
    fn test_ids_are_sorted() {
        let state = SimulationState::new(vec![
            Node::device("b", DeviceKind::Handheld, Angle::default(), false),
            Node::device("a", DeviceKind::Handheld, Angle::default(), false),
        ]);
        assert_eq!(state.node_ids(), vec!["a".to_string(), "b".to_string()]);
    }
}

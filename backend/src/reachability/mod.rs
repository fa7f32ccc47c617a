//! Reachability graph
//!
//! Computes, fresh for every query, the set of nodes a source can exchange
//! data with during the current tick. Nothing is cached: positions change
//! every minute.
//!
//! # Edges
//!
//! A direct edge `from -> to` exists when:
//! - `from` and `to` are different nodes
//! - each kind supports the other
//! - the straight line between them clears the body
//! - their chord distance is within `from`'s range (a device uses its own
//!   range; a satellite uses the satellite's)
//!
//! # Relay extension
//!
//! The search is depth-first from the source. Relay-capable nodes are
//! expanded further; every other node is a leaf. A target reached through a
//! relay must link with that relay and must also support, and be supported
//! by, the original source. Device pairs are the one exception: two devices
//! never talk directly, so a relay is the only way they reach each other.
//! Visited state lives only for the duration of one query.

use crate::geometry::{line_of_sight, placement_distance};
use crate::models::node::Node;
use crate::models::state::SimulationState;
use std::collections::{BTreeSet, HashSet};

/// Whether two distinct nodes support each other's kind
pub fn supports_each_other(a: &Node, b: &Node) -> bool {
    a.id() != b.id() && a.kind().supports(b.kind()) && b.kind().supports(a.kind())
}

/// Whether `from` and `to` are mutually visible and `to` lies within `from`'s range
pub fn in_range(from: &Node, to: &Node) -> bool {
    let (a, b) = (from.placement(), to.placement());
    line_of_sight(&a, &b) && placement_distance(&a, &b) <= from.range()
}

/// Whether a target reached through a relay may exchange data with the source
fn relayable(source: &Node, target: &Node) -> bool {
    supports_each_other(source, target) || (source.is_device() && target.is_device())
}

/// Direct edge test from `from` to `to`
///
/// # Example
/// ```
/// use orbital_relay_sim::geometry::Angle;
/// use orbital_relay_sim::models::{DeviceKind, Node, SatelliteKind};
/// use orbital_relay_sim::reachability::direct_link;
///
/// let laptop = Node::device("L", DeviceKind::Laptop, Angle::from_degrees(90.0), false);
/// let sat = Node::satellite("S", SatelliteKind::Standard, 80_000.0, Angle::from_degrees(92.0));
/// assert!(direct_link(&laptop, &sat));
/// assert!(direct_link(&sat, &laptop));
/// ```
pub fn direct_link(from: &Node, to: &Node) -> bool {
    supports_each_other(from, to) && in_range(from, to)
}

/// Every node the source can reach this tick, directly or through relays
///
/// Unknown sources reach nothing. The source never appears in its own set.
pub fn reachable_from(state: &SimulationState, source_id: &str) -> BTreeSet<String> {
    let mut reachable = BTreeSet::new();
    let Some(source) = state.get_node(source_id) else {
        return reachable;
    };

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(source.id());

    let mut stack: Vec<&Node> = state
        .nodes()
        .filter(|target| direct_link(source, target))
        .collect();

    while let Some(current) = stack.pop() {
        if !visited.insert(current.id()) {
            continue;
        }
        reachable.insert(current.id().to_string());

        if !current.is_relay() {
            continue;
        }
        for target in state.nodes() {
            if visited.contains(target.id()) {
                continue;
            }
            if direct_link(current, target) && relayable(source, target) {
                stack.push(target);
            }
        }
    }

    reachable
}

/// Whether `to` is in `from`'s reachability set this tick
pub fn can_reach(state: &SimulationState, from: &str, to: &str) -> bool {
    reachable_from(state, from).contains(to)
}

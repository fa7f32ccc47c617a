//! Event logging for simulation replay and auditing.
//!
//! Every significant state change is recorded as an `Event`:
//! - **Registry**: nodes entering or leaving the simulation
//! - **Movement**: wrap-teleport resets
//! - **Transfer**: start, rate negotiation, completion, abort and
//!   teleport interruption
//!
//! # Example
//!
//! ```rust
//! use orbital_relay_sim::models::Event;
//!
//! let event = Event::Teleported {
//!     tick: 7,
//!     node_id: "Sat1".to_string(),
//! };
//!
//! assert_eq!(event.tick(), 7);
//! assert_eq!(event.event_type(), "Teleported");
//! ```

use crate::models::node::NodeKind;
use crate::transfer::{AbortReason, Interruption};
use uuid::Uuid;

/// Simulation event capturing a state change.
///
/// Events are logged in the order they occur within a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    NodeAdded {
        tick: usize,
        node_id: String,
        kind: NodeKind,
    },

    /// Node removed; any transfers touching it were dropped
    NodeRemoved {
        tick: usize,
        node_id: String,
        dropped_transfers: usize,
    },

    /// Wrap-teleport reset to 0°
    Teleported { tick: usize, node_id: String },

    TransferStarted {
        tick: usize,
        transfer_id: Uuid,
        file_name: String,
        sender_id: String,
        receiver_id: String,
        size: usize,
    },

    /// Rate pinned for the rest of the transfer (`None` = uncapped)
    RateNegotiated {
        tick: usize,
        transfer_id: Uuid,
        rate: Option<usize>,
    },

    TransferCompleted {
        tick: usize,
        transfer_id: Uuid,
        file_name: String,
        sender_id: String,
        receiver_id: String,
    },

    TransferAborted {
        tick: usize,
        transfer_id: Uuid,
        file_name: String,
        sender_id: String,
        receiver_id: String,
        reason: AbortReason,
    },

    /// Transfer force-completed because an endpoint teleported
    TransferInterrupted {
        tick: usize,
        transfer_id: Uuid,
        file_name: String,
        teleported_id: String,
        resolution: Interruption,
    },
}

impl Event {
    /// Get the tick number when this event occurred
    pub fn tick(&self) -> usize {
        match self {
            Event::NodeAdded { tick, .. }
            | Event::NodeRemoved { tick, .. }
            | Event::Teleported { tick, .. }
            | Event::TransferStarted { tick, .. }
            | Event::RateNegotiated { tick, .. }
            | Event::TransferCompleted { tick, .. }
            | Event::TransferAborted { tick, .. }
            | Event::TransferInterrupted { tick, .. } => *tick,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::NodeAdded { .. } => "NodeAdded",
            Event::NodeRemoved { .. } => "NodeRemoved",
            Event::Teleported { .. } => "Teleported",
            Event::TransferStarted { .. } => "TransferStarted",
            Event::RateNegotiated { .. } => "RateNegotiated",
            Event::TransferCompleted { .. } => "TransferCompleted",
            Event::TransferAborted { .. } => "TransferAborted",
            Event::TransferInterrupted { .. } => "TransferInterrupted",
        }
    }

    /// Get transfer ID if event relates to a specific transfer
    pub fn transfer_id(&self) -> Option<Uuid> {
        match self {
            Event::TransferStarted { transfer_id, .. }
            | Event::RateNegotiated { transfer_id, .. }
            | Event::TransferCompleted { transfer_id, .. }
            | Event::TransferAborted { transfer_id, .. }
            | Event::TransferInterrupted { transfer_id, .. } => Some(*transfer_id),
            _ => None,
        }
    }

    /// Get the node ID for node-scoped events
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Event::NodeAdded { node_id, .. }
            | Event::NodeRemoved { node_id, .. }
            | Event::Teleported { node_id, .. } => Some(node_id),
            Event::TransferInterrupted { teleported_id, .. } => Some(teleported_id),
            _ => None,
        }
    }

    /// Whether the event names the given node
    pub fn involves(&self, id: &str) -> bool {
        match self {
            Event::NodeAdded { node_id, .. }
            | Event::NodeRemoved { node_id, .. }
            | Event::Teleported { node_id, .. } => node_id == id,
            Event::TransferStarted {
                sender_id,
                receiver_id,
                ..
            }
            | Event::TransferCompleted {
                sender_id,
                receiver_id,
                ..
            }
            | Event::TransferAborted {
                sender_id,
                receiver_id,
                ..
            } => sender_id == id || receiver_id == id,
            Event::TransferInterrupted { teleported_id, .. } => teleported_id == id,
            Event::RateNegotiated { .. } => false,
        }
    }
}

/// Event log for storing and querying simulation events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific transfer
    pub fn events_for_transfer(&self, transfer_id: Uuid) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.transfer_id() == Some(transfer_id))
            .collect()
    }

    /// Get events naming a specific node
    pub fn events_for_node(&self, node_id: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.involves(node_id)).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(tick: usize, id: Uuid) -> Event {
        Event::TransferStarted {
            tick,
            transfer_id: id,
            file_name: "f".to_string(),
            sender_id: "A".to_string(),
            receiver_id: "B".to_string(),
            size: 4,
        }
    }

    #[test]
    fn test_filter_by_tick_and_type() {
        let mut log = EventLog::new();
        log.log(started(1, Uuid::new_v4()));
        log.log(Event::Teleported {
            tick: 2,
            node_id: "B".to_string(),
        });

        assert_eq!(log.events_at_tick(1).len(), 1);
        assert_eq!(log.events_of_type("Teleported").len(), 1);
        assert_eq!(log.events_for_node("B").len(), 2);
        assert_eq!(log.events_for_node("C").len(), 0);
    }

    #[test]
    fn test_filter_by_transfer() {
        let id = Uuid::new_v4();
        let mut log = EventLog::new();
        log.log(started(0, id));
        log.log(started(0, Uuid::new_v4()));
        log.log(Event::RateNegotiated {
            tick: 1,
            transfer_id: id,
            rate: Some(3),
        });

        assert_eq!(log.events_for_transfer(id).len(), 2);
    }
}

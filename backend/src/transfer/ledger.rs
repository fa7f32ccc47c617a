//! Transfer ledger
//!
//! Ordered list of in-flight transfers. `initiate` validates and reserves;
//! `advance` moves every entry one tick; `drop_node` clears entries whose
//! endpoint is leaving the simulation.
//!
//! # Critical Invariants
//!
//! 1. **Session pairing**: every live entry holds exactly one upload session
//!    on its sender and one download session on its receiver
//! 2. **No leaks**: an error from `initiate` leaves no reservation and no
//!    placeholder behind
//! 3. **Rate pinning**: the rate is negotiated once and never changes
//! 4. **Source integrity**: the source record is only touched by the
//!    teleport redaction rules

use super::{AbortReason, Interruption, TransferEntry, TransferError, TransferRate, TransferState};
use crate::models::bandwidth::SessionKind;
use crate::models::event::{Event, EventLog};
use crate::models::file::FileRecord;
use crate::models::node::Node;
use crate::models::state::SimulationState;
use crate::reachability::can_reach;
use std::collections::HashSet;
use uuid::Uuid;

/// Counts of entries resolved by one `advance` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceSummary {
    pub completed: usize,
    pub aborted: usize,
    pub interrupted: usize,
}

/// All transfers currently in flight
#[derive(Debug, Clone, Default)]
pub struct TransferLedger {
    entries: Vec<TransferEntry>,
}

impl TransferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TransferEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&TransferEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ========================================================================
    // Initiation
    // ========================================================================

    /// Validate, reserve bandwidth, create the receiver placeholder and
    /// append a new entry
    ///
    /// Checks run in order: unknown node, reachability, source file,
    /// name collision, storage, bandwidth.
    pub fn initiate(
        &mut self,
        state: &mut SimulationState,
        file_name: &str,
        from: &str,
        to: &str,
        tick: usize,
        events: &mut EventLog,
    ) -> Result<Uuid, TransferError> {
        let size = validate(state, file_name, from, to)?;

        reserve(state, from, SessionKind::Upload)?;
        if let Err(err) = reserve(state, to, SessionKind::Download) {
            release(state, from, SessionKind::Upload);
            return Err(err);
        }

        let placed = state
            .get_node_mut(to)
            .and_then(Node::store_mut)
            .map(|store| store.insert(FileRecord::placeholder(file_name, size)));
        match placed {
            Some(Ok(())) => {}
            other => {
                release(state, from, SessionKind::Upload);
                release(state, to, SessionKind::Download);
                let reason = match other {
                    Some(Err(err)) => err.to_string(),
                    _ => "no file store".to_string(),
                };
                return Err(TransferError::NoStorageSpace {
                    node: to.to_string(),
                    reason,
                });
            }
        }

        let entry = TransferEntry::new(file_name, from, to, size, tick);
        let id = entry.id();
        log::debug!("Transfer {} started: {} {} -> {} ({} bytes)", id, file_name, from, to, size);
        events.log(Event::TransferStarted {
            tick,
            transfer_id: id,
            file_name: file_name.to_string(),
            sender_id: from.to_string(),
            receiver_id: to.to_string(),
            size,
        });
        self.entries.push(entry);
        Ok(id)
    }

    // ========================================================================
    // Per-tick advance
    // ========================================================================

    /// Move every open transfer one tick
    ///
    /// `teleported` holds the IDs of nodes that performed a wrap-teleport
    /// reset during this tick's movement phase.
    pub fn advance(
        &mut self,
        state: &mut SimulationState,
        teleported: &HashSet<String>,
        tick: usize,
        events: &mut EventLog,
    ) -> AdvanceSummary {
        let mut summary = AdvanceSummary::default();

        for entry in self.entries.iter_mut() {
            let sender_teleported = teleported.contains(entry.sender_id());
            let receiver_teleported = teleported.contains(entry.receiver_id());

            if !state.contains(entry.sender_id()) || !state.contains(entry.receiver_id()) {
                abort(entry, state, AbortReason::EndpointRemoved, tick, events);
                summary.aborted += 1;
            } else if sender_teleported || receiver_teleported {
                match interrupt(entry, state, sender_teleported, tick, events) {
                    TransferState::Aborted => summary.aborted += 1,
                    _ => summary.interrupted += 1,
                }
            } else if !can_reach(state, entry.sender_id(), entry.receiver_id()) {
                abort(entry, state, AbortReason::OutOfRange, tick, events);
                summary.aborted += 1;
            } else {
                match transfer_chunk(entry, state, tick, events) {
                    TransferState::Completed => summary.completed += 1,
                    TransferState::Aborted => summary.aborted += 1,
                    _ => {}
                }
            }
        }

        self.entries.retain(|entry| !entry.state().is_terminal());
        summary
    }

    /// Abort every entry touching `node_id`; call before removing the node
    ///
    /// Returns the number of entries dropped.
    pub fn drop_node(
        &mut self,
        state: &mut SimulationState,
        node_id: &str,
        tick: usize,
        events: &mut EventLog,
    ) -> usize {
        let mut dropped = 0;
        for entry in self.entries.iter_mut().filter(|entry| entry.involves(node_id)) {
            abort(entry, state, AbortReason::EndpointRemoved, tick, events);
            dropped += 1;
        }
        self.entries.retain(|entry| !entry.state().is_terminal());
        dropped
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Run every precondition without mutating; returns the source size
fn validate(state: &SimulationState, file_name: &str, from: &str, to: &str) -> Result<usize, TransferError> {
    let sender = state
        .get_node(from)
        .ok_or_else(|| TransferError::UnknownNode(from.to_string()))?;
    let receiver = state
        .get_node(to)
        .ok_or_else(|| TransferError::UnknownNode(to.to_string()))?;

    if !can_reach(state, from, to) {
        return Err(TransferError::NotReachable {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let source = sender
        .store()
        .and_then(|store| store.get(file_name))
        .filter(|file| file.is_complete())
        .ok_or_else(|| TransferError::NotFound {
            node: from.to_string(),
            file: file_name.to_string(),
        })?;

    let store = receiver.store().ok_or_else(|| TransferError::NoStorageSpace {
        node: to.to_string(),
        reason: "no file store".to_string(),
    })?;
    if store.contains(file_name) {
        return Err(TransferError::AlreadyExists {
            node: to.to_string(),
            file: file_name.to_string(),
        });
    }
    store
        .check_capacity(source.size())
        .map_err(|err| TransferError::NoStorageSpace {
            node: to.to_string(),
            reason: err.to_string(),
        })?;

    Ok(source.size())
}

fn reserve(state: &mut SimulationState, node_id: &str, kind: SessionKind) -> Result<(), TransferError> {
    match state.get_node_mut(node_id).and_then(Node::bandwidth_mut) {
        Some(bandwidth) => bandwidth.reserve(kind).map_err(|_| TransferError::NoBandwidth {
            node: node_id.to_string(),
            kind,
        }),
        None => Ok(()),
    }
}

fn release(state: &mut SimulationState, node_id: &str, kind: SessionKind) {
    if let Some(bandwidth) = state.get_node_mut(node_id).and_then(Node::bandwidth_mut) {
        bandwidth.release(kind);
    }
}

fn release_sessions(entry: &TransferEntry, state: &mut SimulationState) {
    release(state, entry.sender_id(), SessionKind::Upload);
    release(state, entry.receiver_id(), SessionKind::Download);
}

fn remove_destination(entry: &TransferEntry, state: &mut SimulationState) {
    if let Some(store) = state.get_node_mut(entry.receiver_id()).and_then(Node::store_mut) {
        store.remove(entry.file_name());
    }
}

fn redact_source(entry: &TransferEntry, state: &mut SimulationState) {
    if let Some(store) = state.get_node_mut(entry.sender_id()).and_then(Node::store_mut) {
        store.redact(entry.file_name());
    }
}

/// Complete source content, provided it still matches the entry
fn source_content(entry: &TransferEntry, state: &SimulationState) -> Option<Vec<u8>> {
    state
        .get_node(entry.sender_id())
        .and_then(Node::store)
        .and_then(|store| store.get(entry.file_name()))
        .filter(|file| file.is_complete() && file.size() == entry.size())
        .map(|file| file.content().to_vec())
}

fn destination_filled(entry: &TransferEntry, state: &SimulationState) -> Option<usize> {
    state
        .get_node(entry.receiver_id())
        .and_then(Node::store)
        .and_then(|store| store.get(entry.file_name()))
        .map(|file| file.content().len())
}

fn finish(entry: &mut TransferEntry, state: &mut SimulationState, outcome: TransferState) {
    release_sessions(entry, state);
    entry.state = outcome;
}

fn abort(
    entry: &mut TransferEntry,
    state: &mut SimulationState,
    reason: AbortReason,
    tick: usize,
    events: &mut EventLog,
) {
    remove_destination(entry, state);
    finish(entry, state, TransferState::Aborted);
    log::info!("Transfer {} aborted: {:?}", entry.id(), reason);
    events.log(Event::TransferAborted {
        tick,
        transfer_id: entry.id(),
        file_name: entry.file_name().to_string(),
        sender_id: entry.sender_id().to_string(),
        receiver_id: entry.receiver_id().to_string(),
        reason,
    });
}

/// Pin the rate from both sides' current fair share
fn negotiate(entry: &TransferEntry, state: &SimulationState) -> TransferRate {
    let upload = state
        .get_node(entry.sender_id())
        .and_then(Node::bandwidth)
        .and_then(|bw| bw.rate(SessionKind::Upload));
    let download = state
        .get_node(entry.receiver_id())
        .and_then(Node::bandwidth)
        .and_then(|bw| bw.rate(SessionKind::Download));

    match (upload, download) {
        (Some(up), Some(down)) => TransferRate::Capped(up.min(down) as usize),
        (Some(rate), None) | (None, Some(rate)) => TransferRate::Capped(rate as usize),
        (None, None) => TransferRate::Uncapped,
    }
}

/// One tick of ordinary in-range progress
fn transfer_chunk(
    entry: &mut TransferEntry,
    state: &mut SimulationState,
    tick: usize,
    events: &mut EventLog,
) -> TransferState {
    let (Some(source), Some(filled)) = (source_content(entry, state), destination_filled(entry, state)) else {
        abort(entry, state, AbortReason::SourceChanged, tick, events);
        return entry.state();
    };

    let rate = match entry.rate {
        Some(rate) => rate,
        None => {
            let rate = negotiate(entry, state);
            entry.rate = Some(rate);
            entry.state = TransferState::Transferring;
            log::debug!("Transfer {} negotiated {:?}", entry.id(), rate);
            events.log(Event::RateNegotiated {
                tick,
                transfer_id: entry.id(),
                rate: rate.bytes_per_minute(),
            });
            rate
        }
    };

    let end = match rate {
        TransferRate::Capped(bytes) => (filled + bytes).min(entry.size()),
        TransferRate::Uncapped => entry.size(),
    };
    let chunk = source.get(filled..end).unwrap_or_default();

    let complete = state
        .get_node_mut(entry.receiver_id())
        .and_then(Node::store_mut)
        .and_then(|store| {
            store.append(entry.file_name(), chunk)?;
            store.get(entry.file_name()).map(FileRecord::is_complete)
        })
        .unwrap_or(false);

    if complete {
        finish(entry, state, TransferState::Completed);
        log::debug!("Transfer {} completed", entry.id());
        events.log(Event::TransferCompleted {
            tick,
            transfer_id: entry.id(),
            file_name: entry.file_name().to_string(),
            sender_id: entry.sender_id().to_string(),
            receiver_id: entry.receiver_id().to_string(),
        });
    }
    entry.state()
}

/// Force-complete an open transfer after one of its endpoints teleported
fn interrupt(
    entry: &mut TransferEntry,
    state: &mut SimulationState,
    sender_teleported: bool,
    tick: usize,
    events: &mut EventLog,
) -> TransferState {
    let sender_grounded = state
        .get_node(entry.sender_id())
        .map(Node::is_device)
        .unwrap_or(false);

    let resolution = if sender_teleported {
        Interruption::SenderTeleported
    } else if sender_grounded {
        Interruption::ReceiverDropped
    } else {
        Interruption::ReceiverFlushed
    };

    match resolution {
        Interruption::SenderTeleported | Interruption::ReceiverDropped => {
            remove_destination(entry, state);
            redact_source(entry, state);
        }
        Interruption::ReceiverFlushed => {
            let (Some(source), Some(filled)) = (source_content(entry, state), destination_filled(entry, state))
            else {
                abort(entry, state, AbortReason::SourceChanged, tick, events);
                return entry.state();
            };
            let tail = source.get(filled..).unwrap_or_default();
            if let Some(store) = state.get_node_mut(entry.receiver_id()).and_then(Node::store_mut) {
                store.redact_with_tail(entry.file_name(), filled, tail);
            }
        }
    }

    let teleported_id = if sender_teleported {
        entry.sender_id().to_string()
    } else {
        entry.receiver_id().to_string()
    };
    finish(entry, state, TransferState::Completed);
    log::info!("Transfer {} interrupted by teleport of {}: {:?}", entry.id(), teleported_id, resolution);
    events.log(Event::TransferInterrupted {
        tick,
        transfer_id: entry.id(),
        file_name: entry.file_name().to_string(),
        teleported_id,
        resolution,
    });
    entry.state()
}

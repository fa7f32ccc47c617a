//! File transfers between nodes
//!
//! A transfer copies one complete file from a sender's store into a
//! placeholder record on the receiver, a bandwidth-limited chunk per
//! simulated minute.
//!
//! # State machine
//!
//! ```text
//! Negotiating --(first in-range tick: pin rate)--> Transferring
//! Transferring --(content reaches declared size)--> Completed
//! Negotiating | Transferring --(receiver out of reach)--> Aborted
//! Negotiating | Transferring --(endpoint teleports)--> Completed (forced)
//! ```
//!
//! Terminal entries are dropped from the ledger at the end of the pass that
//! produced them, and both bandwidth sessions are released.

pub mod ledger;

pub use ledger::{AdvanceSummary, TransferLedger};

use crate::models::bandwidth::SessionKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Reasons `initiate_transfer` refuses to start a transfer
///
/// None of these are fatal to the simulation; nothing is left reserved or
/// created when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("{to} is not reachable from {from}")]
    NotReachable { from: String, to: String },

    #[error("File {file} not found on {node}")]
    NotFound { node: String, file: String },

    #[error("File {file} already exists on {node}")]
    AlreadyExists { node: String, file: String },

    #[error("No storage space on {node}: {reason}")]
    NoStorageSpace { node: String, reason: String },

    #[error("No {kind} bandwidth on {node}")]
    NoBandwidth { node: String, kind: SessionKind },
}

/// Lifecycle state of one ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferState {
    /// Waiting for the first in-range tick to pin a rate
    Negotiating,
    Transferring,
    Completed,
    Aborted,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferState::Completed | TransferState::Aborted)
    }
}

/// Bytes per minute pinned at negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferRate {
    Capped(usize),
    /// Neither endpoint limits the rate; the remainder moves in one tick
    Uncapped,
}

impl TransferRate {
    pub fn bytes_per_minute(self) -> Option<usize> {
        match self {
            TransferRate::Capped(rate) => Some(rate),
            TransferRate::Uncapped => None,
        }
    }
}

/// Why a transfer was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// Receiver no longer in the sender's reachability set
    OutOfRange,
    /// Source record vanished or was resized mid-transfer
    SourceChanged,
    /// Sender or receiver left the simulation
    EndpointRemoved,
}

/// How a teleport resolved an open transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interruption {
    /// Sender teleported: destination dropped, source redacted
    SenderTeleported,
    /// Receiver teleported while fed by a satellite: unfilled remainder
    /// redacted into the destination, which completes
    ReceiverFlushed,
    /// Receiver teleported while fed by a ground device: destination
    /// dropped, the device's original redacted
    ReceiverDropped,
}

/// One in-flight file copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEntry {
    id: Uuid,
    file_name: String,
    sender_id: String,
    receiver_id: String,
    /// Declared size of the source when the transfer started
    size: usize,
    rate: Option<TransferRate>,
    state: TransferState,
    started_tick: usize,
}

impl TransferEntry {
    fn new(file_name: &str, sender_id: &str, receiver_id: &str, size: usize, tick: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            size,
            rate: None,
            state: TransferState::Negotiating,
            started_tick: tick,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn receiver_id(&self) -> &str {
        &self.receiver_id
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Pinned rate, `None` while still negotiating
    pub fn rate(&self) -> Option<TransferRate> {
        self.rate
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn started_tick(&self) -> usize {
        self.started_tick
    }

    pub fn involves(&self, node_id: &str) -> bool {
        self.sender_id == node_id || self.receiver_id == node_id
    }
}

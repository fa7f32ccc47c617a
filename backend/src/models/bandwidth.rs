//! Bandwidth accounting
//!
//! Each node that can hold files carries a bandwidth profile (nominal
//! bytes/minute for uploads and downloads) and live session counters. The
//! nominal capacity is split evenly between concurrent sessions:
//!
//! ```text
//! per_session_rate = floor(capacity / max(1, sessions))
//! ```
//!
//! A new session may only start if the rate it would get is non-zero.
//! `None` capacity means unlimited: such a side never caps a transfer and
//! never refuses a session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which half of a node's bandwidth a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Upload,
    Download,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKind::Upload => write!(f, "upload"),
            SessionKind::Download => write!(f, "download"),
        }
    }
}

/// Errors from session reservation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BandwidthError {
    #[error("No {kind} bandwidth: {capacity} bytes/min cannot serve {sessions} sessions")]
    Saturated {
        kind: SessionKind,
        capacity: u32,
        sessions: u32,
    },
}

/// Nominal capacity in bytes per minute; `None` is unlimited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandwidthProfile {
    pub max_upload: Option<u32>,
    pub max_download: Option<u32>,
}

impl BandwidthProfile {
    pub fn new(max_upload: Option<u32>, max_download: Option<u32>) -> Self {
        Self {
            max_upload,
            max_download,
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn capacity(&self, kind: SessionKind) -> Option<u32> {
        match kind {
            SessionKind::Upload => self.max_upload,
            SessionKind::Download => self.max_download,
        }
    }
}

/// Profile plus in-flight session counters
///
/// # Example
/// ```
/// use orbital_relay_sim::models::{Bandwidth, BandwidthProfile, SessionKind};
///
/// let mut bw = Bandwidth::new(BandwidthProfile::new(Some(10), Some(15)));
/// bw.reserve(SessionKind::Upload).unwrap();
/// bw.reserve(SessionKind::Upload).unwrap();
/// assert_eq!(bw.rate(SessionKind::Upload), Some(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bandwidth {
    profile: BandwidthProfile,
    uploads: u32,
    downloads: u32,
}

impl Bandwidth {
    pub fn new(profile: BandwidthProfile) -> Self {
        Self {
            profile,
            uploads: 0,
            downloads: 0,
        }
    }

    pub fn profile(&self) -> BandwidthProfile {
        self.profile
    }

    /// Active sessions of the given kind
    pub fn sessions(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Upload => self.uploads,
            SessionKind::Download => self.downloads,
        }
    }

    fn sessions_mut(&mut self, kind: SessionKind) -> &mut u32 {
        match kind {
            SessionKind::Upload => &mut self.uploads,
            SessionKind::Download => &mut self.downloads,
        }
    }

    /// Fair per-session rate right now; `None` when uncapped
    pub fn rate(&self, kind: SessionKind) -> Option<u32> {
        self.profile
            .capacity(kind)
            .map(|capacity| capacity / self.sessions(kind).max(1))
    }

    /// Whether one more session of this kind would still get a non-zero rate
    pub fn can_reserve(&self, kind: SessionKind) -> bool {
        match self.profile.capacity(kind) {
            None => true,
            Some(capacity) => capacity / (self.sessions(kind) + 1) > 0,
        }
    }

    /// Start a session, refusing if its fair share would floor to zero
    pub fn reserve(&mut self, kind: SessionKind) -> Result<(), BandwidthError> {
        if !self.can_reserve(kind) {
            return Err(BandwidthError::Saturated {
                kind,
                capacity: self.profile.capacity(kind).unwrap_or(0),
                sessions: self.sessions(kind) + 1,
            });
        }
        *self.sessions_mut(kind) += 1;
        Ok(())
    }

    /// End a session; the counter never drops below zero
    pub fn release(&mut self, kind: SessionKind) {
        let count = self.sessions_mut(kind);
        if *count == 0 {
            log::warn!("Released a {} session that was never reserved", kind);
            return;
        }
        *count -= 1;
    }
}

//! Sync engine data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::SnapshotError;

/// Errors that abort a sync run before it drains anything.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Another drain is already in flight for this event.
    #[error("Sync already in progress")]
    InProgress,

    /// The device is offline; syncing is a forced-online operation.
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The pending queue could not be read.
    #[error(transparent)]
    Storage(#[from] SnapshotError),
}

/// How a rejected pending admission is reconciled.
///
/// The guest was already physically admitted when the conflict is
/// discovered, so every policy is about reporting, not about the admission
/// itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The earlier backend admission stands; ours is dropped from the queue
    /// and reported for manual follow-up. Nothing is revoked.
    #[default]
    FirstAdmissionWins,
    // Future: hold conflicted entries for operator review instead of
    // dropping them.
}

/// A pending admission the backend rejected because another source consumed
/// the ticket first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConflict {
    pub code: String,
    /// When this device admitted the guest.
    pub scanned_at: DateTime<Utc>,
}

/// Result of one sync run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SyncReport {
    /// Entries taken off the queue this run (accepted + conflicts +
    /// integrity errors).
    pub processed: usize,
    /// Entries the backend accepted.
    pub accepted: usize,
    /// Entries rejected because another source admitted the ticket first.
    pub conflicts: Vec<SyncConflict>,
    /// Entries dropped because the backend no longer knows the ticket (or
    /// it moved events).
    pub integrity_errors: usize,
    /// Entries still queued after the run; nonzero when a network failure
    /// interrupted the drain.
    pub remaining: usize,
}

impl SyncReport {
    /// True when the queue was fully drained.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

//! Snapshot and pending-queue data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::TicketStatus;

/// Errors from the offline snapshot store and manager.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The local database could not be read or written. Callers treat this
    /// as "no offline data" rather than a crash.
    #[error("Offline store error: {0}")]
    Storage(String),

    /// A forced-online operation (download) could not reach the directory.
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The directory answered, but with an error.
    #[error("Directory error: {0}")]
    Directory(String),

    /// The ticket is not present in the snapshot, or is not consumable.
    /// Only returned by the admit operation; scan-level taxonomy mapping
    /// happens in the offline engine.
    #[error("Cannot admit {code}: {reason}")]
    NotAdmissible { code: String, reason: String },
}

/// One ticket in the local snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotEntry {
    pub code: String,
    pub status: TicketStatus,
    pub participant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_category_name: Option<String>,
}

/// Metadata about a stored snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SnapshotInfo {
    pub event_id: String,
    pub downloaded_at: DateTime<Utc>,
    pub ticket_count: usize,
}

/// A locally recorded offline admission awaiting backend reconciliation.
///
/// Sequence numbers come from a SQLite AUTOINCREMENT column, so FIFO order
/// survives process restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingCheckIn {
    pub sequence_no: i64,
    pub code: String,
    /// Device-local time of the admission; submitted to the backend as the
    /// check-in timestamp during sync.
    pub scanned_at: DateTime<Utc>,
}

/// Result of clearing a snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClearedSnapshot {
    pub event_id: String,
    /// Unsynced admissions that were discarded along with the snapshot.
    pub dropped_pending: usize,
}

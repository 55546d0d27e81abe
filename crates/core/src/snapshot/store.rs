//! Snapshot storage trait.

use chrono::{DateTime, Utc};

use super::{ClearedSnapshot, PendingCheckIn, SnapshotEntry, SnapshotError, SnapshotInfo};

/// Storage backend for the offline snapshot and the pending admission queue.
///
/// The store is exclusively owned by one device's session; implementations
/// only need internal locking, not cross-process coordination.
pub trait SnapshotStore: Send + Sync {
    /// Replace any existing snapshot for the event with the given entries,
    /// atomically. The previous snapshot must remain intact if this fails.
    fn replace_snapshot(
        &self,
        event_id: &str,
        entries: &[SnapshotEntry],
        downloaded_at: DateTime<Utc>,
    ) -> Result<SnapshotInfo, SnapshotError>;

    /// Delete the snapshot and all pending admissions for the event, in one
    /// transaction. Returns how many unsynced admissions were discarded.
    fn clear_snapshot(&self, event_id: &str) -> Result<ClearedSnapshot, SnapshotError>;

    /// Snapshot metadata, or `None` if no snapshot is stored for the event.
    fn snapshot_info(&self, event_id: &str) -> Result<Option<SnapshotInfo>, SnapshotError>;

    /// Look up one snapshot entry by code.
    fn entry(&self, event_id: &str, code: &str) -> Result<Option<SnapshotEntry>, SnapshotError>;

    /// Admit a ticket offline: mark the snapshot entry used and append a
    /// pending check-in, in one transaction. A crash between the two writes
    /// must not be observable.
    ///
    /// Fails [`SnapshotError::NotAdmissible`] if the entry is absent or not
    /// in a consumable state; the queue never gains a second entry for the
    /// same code.
    fn admit(
        &self,
        event_id: &str,
        code: &str,
        scanned_at: DateTime<Utc>,
    ) -> Result<PendingCheckIn, SnapshotError>;

    /// All pending admissions for the event, in FIFO order.
    fn pending(&self, event_id: &str) -> Result<Vec<PendingCheckIn>, SnapshotError>;

    /// Number of pending admissions. Callable at any time, including while a
    /// sync drain is in flight.
    fn pending_count(&self, event_id: &str) -> Result<usize, SnapshotError>;

    /// Remove one pending admission after the backend acknowledged or
    /// permanently rejected it.
    fn remove_pending(&self, event_id: &str, sequence_no: i64) -> Result<(), SnapshotError>;
}

//! Offline snapshot management.
//!
//! A snapshot is a per-event, point-in-time copy of the ticket directory,
//! held in a device-local SQLite database together with the queue of pending
//! offline admissions. The snapshot is immutable until refreshed: a download
//! replaces it wholesale, a clear deletes it (and the pending queue with it).

mod manager;
mod sqlite;
mod store;
mod types;

pub use manager::SnapshotManager;
pub use sqlite::SqliteSnapshotStore;
pub use store::SnapshotStore;
pub use types::{ClearedSnapshot, PendingCheckIn, SnapshotEntry, SnapshotError, SnapshotInfo};

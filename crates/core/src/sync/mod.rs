//! Synchronization of pending offline admissions.
//!
//! The sync engine drains the pending queue in FIFO order against the
//! directory service's atomic check-in operation and reconciles each entry:
//! accepted, conflicted (another source consumed the ticket first), or
//! dropped as a data-integrity error. A network failure mid-drain stops the
//! run and leaves the remainder queued for a later resume.

mod engine;
mod types;

pub use engine::SyncEngine;
pub use types::{ConflictPolicy, SyncConflict, SyncError, SyncReport};

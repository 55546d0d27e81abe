//! Audit log.
//!
//! Typed events describing what the device did: snapshot lifecycle, accepted
//! admissions, sync runs, and above all sync conflicts and
//! data-integrity errors, which accumulate here as the batch report for
//! manual follow-up. Events flow through an async channel to a background
//! writer so emitting never blocks the scan path.

mod events;
mod handle;
mod sqlite;
mod store;
mod writer;

pub use events::AuditEvent;
pub use handle::{AuditEventEnvelope, AuditHandle};
pub use sqlite::SqliteAuditStore;
pub use store::{AuditError, AuditFilter, AuditRecord, AuditStore};
pub use writer::{create_audit_system, AuditWriter};

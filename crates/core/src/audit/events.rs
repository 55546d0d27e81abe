use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Snapshot lifecycle
    SnapshotDownloaded {
        event_id: String,
        ticket_count: u32,
    },
    /// Offline data was cleared; any unsynced admissions went with it.
    SnapshotCleared {
        event_id: String,
        dropped_pending: u32,
    },

    // Admissions
    CheckInAccepted {
        event_id: String,
        code: String,
        /// "online" or "offline".
        mode: String,
    },

    // Sync runs
    SyncStarted {
        event_id: String,
        pending: u32,
    },
    SyncCompleted {
        event_id: String,
        processed: u32,
        accepted: u32,
        conflicts: u32,
        integrity_errors: u32,
        remaining: u32,
    },
    /// A pending admission lost to another source; the guest was already
    /// physically admitted, so this needs manual follow-up, not retry.
    SyncConflict {
        event_id: String,
        code: String,
        scanned_at: DateTime<Utc>,
    },
    /// A pending admission referenced a ticket the directory no longer
    /// recognizes for this event.
    DataIntegrityError {
        event_id: String,
        code: String,
        reason: String,
    },
}

impl AuditEvent {
    /// Returns the event type as a string (for storage and filtering)
    pub fn event_type(&self) -> &'static str {
        match self {
            AuditEvent::ServiceStarted { .. } => "service_started",
            AuditEvent::ServiceStopped { .. } => "service_stopped",
            AuditEvent::SnapshotDownloaded { .. } => "snapshot_downloaded",
            AuditEvent::SnapshotCleared { .. } => "snapshot_cleared",
            AuditEvent::CheckInAccepted { .. } => "check_in_accepted",
            AuditEvent::SyncStarted { .. } => "sync_started",
            AuditEvent::SyncCompleted { .. } => "sync_completed",
            AuditEvent::SyncConflict { .. } => "sync_conflict",
            AuditEvent::DataIntegrityError { .. } => "data_integrity_error",
        }
    }

    /// Returns the ticket code this event concerns, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            AuditEvent::CheckInAccepted { code, .. }
            | AuditEvent::SyncConflict { code, .. }
            | AuditEvent::DataIntegrityError { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns the event id this event concerns, if any
    pub fn event_id(&self) -> Option<&str> {
        match self {
            AuditEvent::SnapshotDownloaded { event_id, .. }
            | AuditEvent::SnapshotCleared { event_id, .. }
            | AuditEvent::CheckInAccepted { event_id, .. }
            | AuditEvent::SyncStarted { event_id, .. }
            | AuditEvent::SyncCompleted { event_id, .. }
            | AuditEvent::SyncConflict { event_id, .. }
            | AuditEvent::DataIntegrityError { event_id, .. } => Some(event_id),
            AuditEvent::ServiceStarted { .. } | AuditEvent::ServiceStopped { .. } => None,
        }
    }
}

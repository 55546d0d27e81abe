//! Snapshot lifecycle management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::audit::{AuditEvent, AuditHandle};
use crate::connectivity::ConnectivityProbe;
use crate::directory::TicketDirectory;
use crate::metrics::{PENDING_DROPPED, SNAPSHOT_CLEARS, SNAPSHOT_DOWNLOADS};

use super::{ClearedSnapshot, SnapshotEntry, SnapshotError, SnapshotInfo, SnapshotStore};

/// Manages the device-local snapshot for the active event.
///
/// Download is a forced-online operation: it fails `NetworkUnavailable`
/// without mutating the existing snapshot when the directory is unreachable.
/// Query methods treat an unreadable store as "no offline data" rather than
/// propagating the failure, so a corrupt database degrades the device to
/// online-only operation instead of crashing it.
pub struct SnapshotManager {
    event_id: String,
    store: Arc<dyn SnapshotStore>,
    directory: Arc<dyn TicketDirectory>,
    probe: Arc<dyn ConnectivityProbe>,
    audit: Option<AuditHandle>,
}

impl SnapshotManager {
    /// Create a new manager for the given event.
    pub fn new(
        event_id: impl Into<String>,
        store: Arc<dyn SnapshotStore>,
        directory: Arc<dyn TicketDirectory>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            store,
            directory,
            probe,
            audit: None,
        }
    }

    /// Attach an audit handle for emitting snapshot lifecycle events.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// The event this manager serves.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Download a fresh snapshot, replacing any prior one for this event.
    ///
    /// The pending admission queue is left untouched; only an explicit
    /// [`clear`](Self::clear) discards it.
    pub async fn download(&self) -> Result<SnapshotInfo, SnapshotError> {
        if !self.probe.is_online().await {
            return Err(SnapshotError::NetworkUnavailable(
                "device is offline".to_string(),
            ));
        }

        let rows = self
            .directory
            .fetch_snapshot(&self.event_id)
            .await
            .map_err(|e| {
                if e.is_transport() {
                    SnapshotError::NetworkUnavailable(e.to_string())
                } else {
                    SnapshotError::Directory(e.to_string())
                }
            })?;

        let entries: Vec<SnapshotEntry> = rows
            .into_iter()
            .map(|row| SnapshotEntry {
                code: row.code,
                status: row.status,
                participant_name: row.participant_name,
                ticket_category_name: row.ticket_category_name,
            })
            .collect();

        let info = self
            .store
            .replace_snapshot(&self.event_id, &entries, Utc::now())?;

        info!(
            event_id = %self.event_id,
            tickets = info.ticket_count,
            "Snapshot downloaded"
        );
        SNAPSHOT_DOWNLOADS.inc();

        if let Some(audit) = &self.audit {
            audit
                .emit(AuditEvent::SnapshotDownloaded {
                    event_id: self.event_id.clone(),
                    ticket_count: info.ticket_count as u32,
                })
                .await;
        }

        Ok(info)
    }

    /// Delete the snapshot and any unsynced pending admissions.
    ///
    /// Dropping unsynced admissions is deliberate but surprising; the count
    /// is logged, returned, and recorded in the audit log so the operator
    /// sees what was lost.
    pub fn clear(&self) -> Result<ClearedSnapshot, SnapshotError> {
        let pending = self.store.pending_count(&self.event_id).unwrap_or(0);
        if pending > 0 {
            warn!(
                event_id = %self.event_id,
                pending = pending,
                "Clearing offline data with unsynced admissions; they will be discarded"
            );
        }

        let cleared = self.store.clear_snapshot(&self.event_id)?;

        info!(
            event_id = %self.event_id,
            dropped_pending = cleared.dropped_pending,
            "Offline data cleared"
        );
        SNAPSHOT_CLEARS.inc();
        PENDING_DROPPED.inc_by(cleared.dropped_pending as u64);

        if let Some(audit) = &self.audit {
            audit.try_emit(AuditEvent::SnapshotCleared {
                event_id: self.event_id.clone(),
                dropped_pending: cleared.dropped_pending as u32,
            });
        }

        Ok(cleared)
    }

    /// True if a snapshot is stored for this event.
    pub fn has_snapshot(&self) -> bool {
        match self.store.snapshot_info(&self.event_id) {
            Ok(info) => info.is_some(),
            Err(e) => {
                warn!(event_id = %self.event_id, "Unreadable offline store: {}", e);
                false
            }
        }
    }

    /// Number of tickets in the stored snapshot (0 if none).
    pub fn ticket_count(&self) -> usize {
        match self.store.snapshot_info(&self.event_id) {
            Ok(Some(info)) => info.ticket_count,
            Ok(None) => 0,
            Err(e) => {
                warn!(event_id = %self.event_id, "Unreadable offline store: {}", e);
                0
            }
        }
    }

    /// When the stored snapshot was downloaded, if one exists.
    pub fn last_download_time(&self) -> Option<DateTime<Utc>> {
        match self.store.snapshot_info(&self.event_id) {
            Ok(info) => info.map(|i| i.downloaded_at),
            Err(e) => {
                warn!(event_id = %self.event_id, "Unreadable offline store: {}", e);
                None
            }
        }
    }

    /// Number of unsynced pending admissions (0 if the store is unreadable).
    pub fn pending_count(&self) -> usize {
        match self.store.pending_count(&self.event_id) {
            Ok(count) => count,
            Err(e) => {
                warn!(event_id = %self.event_id, "Unreadable offline store: {}", e);
                0
            }
        }
    }
}

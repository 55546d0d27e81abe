//! Sync engine implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::audit::{AuditEvent, AuditHandle};
use crate::connectivity::ConnectivityProbe;
use crate::directory::{CheckInOutcome, TicketDirectory};
use crate::metrics::{SYNC_ACCEPTED, SYNC_CONFLICTS, SYNC_INTEGRITY_ERRORS, SYNC_RUNS};
use crate::snapshot::{PendingCheckIn, SnapshotStore};

use super::{ConflictPolicy, SyncConflict, SyncError, SyncReport};

/// How one queue entry was reconciled against the backend.
enum Reconciled {
    Accepted,
    Conflict,
    IntegrityError,
}

/// Drains pending offline admissions against the directory service.
///
/// One engine serves one event; [`sync_pending`](Self::sync_pending) is
/// mutually exclusive with itself, so at most one drain is in flight.
pub struct SyncEngine {
    event_id: String,
    store: Arc<dyn SnapshotStore>,
    directory: Arc<dyn TicketDirectory>,
    probe: Arc<dyn ConnectivityProbe>,
    policy: ConflictPolicy,
    audit: Option<AuditHandle>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a drain ends, however it ends.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncEngine {
    /// Create a new engine for the given event.
    pub fn new(
        event_id: impl Into<String>,
        store: Arc<dyn SnapshotStore>,
        directory: Arc<dyn TicketDirectory>,
        probe: Arc<dyn ConnectivityProbe>,
        policy: ConflictPolicy,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            store,
            directory,
            probe,
            policy,
            audit: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Attach an audit handle for recording sync runs and conflicts.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Number of unsynced admissions. Callable at any time, including while
    /// a drain is in flight.
    pub fn pending_count(&self) -> usize {
        match self.store.pending_count(&self.event_id) {
            Ok(count) => count,
            Err(e) => {
                warn!(event_id = %self.event_id, "Unreadable offline store: {}", e);
                0
            }
        }
    }

    /// True while a drain is in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Drain the pending queue in FIFO order.
    ///
    /// Each entry is submitted through the directory's atomic check-in. On a
    /// network failure mid-drain the run stops immediately, leaves the rest
    /// of the queue untouched, and the report's `remaining` tells the caller
    /// there is more to do once connectivity returns.
    pub async fn sync_pending(&self) -> Result<SyncReport, SyncError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::InProgress);
        }
        let _guard = DrainGuard(&self.in_flight);

        if !self.probe.is_online().await {
            return Err(SyncError::NetworkUnavailable(
                "device is offline".to_string(),
            ));
        }

        let queue = self.store.pending(&self.event_id)?;

        info!(
            event_id = %self.event_id,
            pending = queue.len(),
            "Sync drain started"
        );

        if let Some(audit) = &self.audit {
            audit
                .emit(AuditEvent::SyncStarted {
                    event_id: self.event_id.clone(),
                    pending: queue.len() as u32,
                })
                .await;
        }

        let mut report = SyncReport {
            processed: 0,
            accepted: 0,
            conflicts: Vec::new(),
            integrity_errors: 0,
            remaining: 0,
        };

        for (idx, entry) in queue.iter().enumerate() {
            match self.reconcile(entry).await {
                Ok(Reconciled::Accepted) => {
                    report.processed += 1;
                    report.accepted += 1;
                }
                Ok(Reconciled::Conflict) => {
                    report.processed += 1;
                    report.conflicts.push(SyncConflict {
                        code: entry.code.clone(),
                        scanned_at: entry.scanned_at,
                    });
                }
                Ok(Reconciled::IntegrityError) => {
                    report.processed += 1;
                    report.integrity_errors += 1;
                }
                Err(e) => {
                    // Stop immediately; the remaining entries stay queued
                    // for a later resume.
                    warn!(
                        code = %entry.code,
                        "Sync drain interrupted: {}",
                        e
                    );
                    report.remaining = queue.len() - idx;
                    break;
                }
            }
        }

        let result = if report.is_complete() {
            "completed"
        } else {
            "interrupted"
        };
        SYNC_RUNS.with_label_values(&[result]).inc();
        SYNC_ACCEPTED.inc_by(report.accepted as u64);
        SYNC_CONFLICTS.inc_by(report.conflicts.len() as u64);
        SYNC_INTEGRITY_ERRORS.inc_by(report.integrity_errors as u64);

        info!(
            event_id = %self.event_id,
            processed = report.processed,
            accepted = report.accepted,
            conflicts = report.conflicts.len(),
            integrity_errors = report.integrity_errors,
            remaining = report.remaining,
            "Sync drain {}",
            result
        );

        if let Some(audit) = &self.audit {
            audit
                .emit(AuditEvent::SyncCompleted {
                    event_id: self.event_id.clone(),
                    processed: report.processed as u32,
                    accepted: report.accepted as u32,
                    conflicts: report.conflicts.len() as u32,
                    integrity_errors: report.integrity_errors as u32,
                    remaining: report.remaining as u32,
                })
                .await;
        }

        Ok(report)
    }

    /// Reconcile one queue entry. `Err` means the backend was unreachable
    /// and the entry must stay queued.
    async fn reconcile(&self, entry: &PendingCheckIn) -> Result<Reconciled, ReconcileError> {
        let record = match self.directory.lookup(&entry.code).await? {
            Some(record) => record,
            None => {
                error!(
                    code = %entry.code,
                    "Pending admission references a ticket the directory does not know"
                );
                self.drop_integrity_error(entry, "not_found").await?;
                return Ok(Reconciled::IntegrityError);
            }
        };

        if record.event_id != self.event_id {
            error!(
                code = %entry.code,
                ticket_event = %record.event_id,
                "Pending admission references a ticket from another event"
            );
            self.drop_integrity_error(entry, "wrong_event").await?;
            return Ok(Reconciled::IntegrityError);
        }

        // Submit with the device-local admission time, not the sync time.
        match self
            .directory
            .check_in(&record.id, entry.scanned_at)
            .await?
        {
            CheckInOutcome::Accepted => {
                debug!(code = %entry.code, "Pending admission acknowledged");
                self.store
                    .remove_pending(&self.event_id, entry.sequence_no)?;
                Ok(Reconciled::Accepted)
            }
            CheckInOutcome::AlreadyUsed => {
                // Another device's sync (or an online scan) consumed the
                // ticket first.
                warn!(code = %entry.code, "Sync conflict: ticket already consumed");
                self.store
                    .remove_pending(&self.event_id, entry.sequence_no)?;

                match self.policy {
                    // The guest this device admitted is already inside;
                    // report for manual follow-up, revoke nothing.
                    ConflictPolicy::FirstAdmissionWins => {}
                }

                if let Some(audit) = &self.audit {
                    audit
                        .emit(AuditEvent::SyncConflict {
                            event_id: self.event_id.clone(),
                            code: entry.code.clone(),
                            scanned_at: entry.scanned_at,
                        })
                        .await;
                }

                Ok(Reconciled::Conflict)
            }
        }
    }

    async fn drop_integrity_error(
        &self,
        entry: &PendingCheckIn,
        reason: &str,
    ) -> Result<(), ReconcileError> {
        self.store
            .remove_pending(&self.event_id, entry.sequence_no)?;

        if let Some(audit) = &self.audit {
            audit
                .emit(AuditEvent::DataIntegrityError {
                    event_id: self.event_id.clone(),
                    code: entry.code.clone(),
                    reason: reason.to_string(),
                })
                .await;
        }

        Ok(())
    }
}

/// Failure of a single reconciliation step; always interrupts the drain.
#[derive(Debug, thiserror::Error)]
enum ReconcileError {
    #[error(transparent)]
    Directory(#[from] crate::directory::DirectoryError),

    #[error(transparent)]
    Storage(#[from] crate::snapshot::SnapshotError),
}

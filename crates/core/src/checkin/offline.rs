//! Offline check-in against the local snapshot.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::audit::{AuditEvent, AuditHandle};
use crate::metrics::CHECKINS_TOTAL;
use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::ticket::{ScanFailure, ScanOutcome, TicketStatus};

/// Validates and consumes tickets purely against the local snapshot.
///
/// Admissions are unconfirmed: the snapshot is a point-in-time copy, so two
/// offline devices can each admit the same code before either syncs. The
/// sync engine detects and reports that; this engine only guarantees at most
/// one admission per code per device.
pub struct OfflineEngine {
    event_id: String,
    store: Arc<dyn SnapshotStore>,
    audit: Option<AuditHandle>,
}

impl OfflineEngine {
    /// Create a new engine for the given event.
    pub fn new(event_id: impl Into<String>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            event_id: event_id.into(),
            store,
            audit: None,
        }
    }

    /// Attach an audit handle for recording accepted admissions.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Check a ticket in against the local snapshot.
    ///
    /// The snapshot is already event-scoped, so a code from another event
    /// simply is not present and surfaces as `NotFound`. On success the
    /// snapshot entry is marked used and a pending check-in is enqueued in
    /// one transaction, and the outcome is tagged `is_offline: true`.
    pub fn check_in(&self, code: &str) -> ScanOutcome {
        let entry = match self.store.entry(&self.event_id, code) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(code = code, "Offline check-in: code not in snapshot");
                return ScanOutcome::failure(ScanFailure::NotFound);
            }
            Err(e) => {
                warn!(code = code, "Offline store unreadable: {}", e);
                return ScanOutcome::failure(ScanFailure::StorageCorruption);
            }
        };

        match entry.status {
            TicketStatus::Used => return ScanOutcome::failure(ScanFailure::AlreadyUsed),
            TicketStatus::Cancelled => return ScanOutcome::failure(ScanFailure::Cancelled),
            TicketStatus::Valid => {}
        }

        match self.store.admit(&self.event_id, code, Utc::now()) {
            Ok(pending) => {
                info!(
                    code = code,
                    sequence_no = pending.sequence_no,
                    "Ticket admitted offline"
                );
                CHECKINS_TOTAL.with_label_values(&["offline"]).inc();

                if let Some(audit) = &self.audit {
                    audit.try_emit(AuditEvent::CheckInAccepted {
                        event_id: self.event_id.clone(),
                        code: code.to_string(),
                        mode: "offline".to_string(),
                    });
                }

                ScanOutcome::Success {
                    participant_name: entry.participant_name,
                    ticket_category_name: entry.ticket_category_name,
                    is_offline: true,
                }
            }
            // Raced with an earlier admission of the same code on this
            // device (e.g. after a re-download reset the entry status).
            Err(SnapshotError::NotAdmissible { .. }) => {
                ScanOutcome::failure(ScanFailure::AlreadyUsed)
            }
            Err(e) => {
                warn!(code = code, "Offline admit failed: {}", e);
                ScanOutcome::failure(ScanFailure::StorageCorruption)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{SnapshotEntry, SqliteSnapshotStore};

    const EVENT: &str = "e-1";

    fn entry(code: &str, status: TicketStatus) -> SnapshotEntry {
        SnapshotEntry {
            code: code.to_string(),
            status,
            participant_name: "Ada".to_string(),
            ticket_category_name: None,
        }
    }

    fn make_engine() -> (OfflineEngine, Arc<SqliteSnapshotStore>) {
        let store = Arc::new(SqliteSnapshotStore::in_memory().unwrap());
        store
            .replace_snapshot(
                EVENT,
                &[
                    entry("EVT-ABC123-XY12", TicketStatus::Valid),
                    entry("EVT-ABC123-ZZ99", TicketStatus::Used),
                    entry("EVT-ABC123-CANC", TicketStatus::Cancelled),
                ],
                Utc::now(),
            )
            .unwrap();

        let engine = OfflineEngine::new(EVENT, Arc::clone(&store) as Arc<dyn SnapshotStore>);
        (engine, store)
    }

    #[test]
    fn test_valid_ticket_admitted_offline() {
        let (engine, store) = make_engine();

        let outcome = engine.check_in("EVT-ABC123-XY12");
        assert_eq!(
            outcome,
            ScanOutcome::Success {
                participant_name: "Ada".to_string(),
                ticket_category_name: None,
                is_offline: true,
            }
        );

        // Snapshot updated and exactly one pending entry appended.
        let updated = store.entry(EVENT, "EVT-ABC123-XY12").unwrap().unwrap();
        assert_eq!(updated.status, TicketStatus::Used);
        assert_eq!(store.pending_count(EVENT).unwrap(), 1);
    }

    #[test]
    fn test_repeat_scan_rejected_without_requeue() {
        let (engine, store) = make_engine();

        assert!(engine.check_in("EVT-ABC123-XY12").is_success());
        let second = engine.check_in("EVT-ABC123-XY12");

        assert_eq!(second.failure_kind(), Some(ScanFailure::AlreadyUsed));
        assert_eq!(store.pending_count(EVENT).unwrap(), 1);
    }

    #[test]
    fn test_absent_code_yields_not_found_without_mutation() {
        let (engine, store) = make_engine();

        let outcome = engine.check_in("EVT-NOPE00-0000");
        assert_eq!(outcome.failure_kind(), Some(ScanFailure::NotFound));
        assert_eq!(store.pending_count(EVENT).unwrap(), 0);
    }

    #[test]
    fn test_used_entry_yields_already_used() {
        let (engine, store) = make_engine();

        let outcome = engine.check_in("EVT-ABC123-ZZ99");
        assert_eq!(outcome.failure_kind(), Some(ScanFailure::AlreadyUsed));
        assert_eq!(store.pending_count(EVENT).unwrap(), 0);
    }

    #[test]
    fn test_cancelled_entry_yields_cancelled() {
        let (engine, store) = make_engine();

        let outcome = engine.check_in("EVT-ABC123-CANC");
        assert_eq!(outcome.failure_kind(), Some(ScanFailure::Cancelled));
        assert_eq!(store.pending_count(EVENT).unwrap(), 0);
    }

    #[test]
    fn test_empty_store_yields_not_found() {
        let store = Arc::new(SqliteSnapshotStore::in_memory().unwrap());
        let engine = OfflineEngine::new(EVENT, store as Arc<dyn SnapshotStore>);

        let outcome = engine.check_in("EVT-ABC123-XY12");
        assert_eq!(outcome.failure_kind(), Some(ScanFailure::NotFound));
    }
}

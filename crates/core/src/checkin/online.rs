//! Online check-in against the ticket directory service.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::audit::{AuditEvent, AuditHandle};
use crate::directory::{CheckInOutcome, DirectoryError, TicketDirectory};
use crate::metrics::CHECKINS_TOTAL;
use crate::ticket::{ScanFailure, ScanOutcome, TicketStatus};

/// Validates and consumes tickets directly against the directory service.
pub struct OnlineValidator {
    event_id: String,
    directory: Arc<dyn TicketDirectory>,
    audit: Option<AuditHandle>,
}

impl OnlineValidator {
    /// Create a new validator for the given event.
    pub fn new(event_id: impl Into<String>, directory: Arc<dyn TicketDirectory>) -> Self {
        Self {
            event_id: event_id.into(),
            directory,
            audit: None,
        }
    }

    /// Attach an audit handle for recording accepted admissions.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Check a ticket in against the directory service.
    ///
    /// Ticket-level rejections (`NotFound`, `WrongEvent`, `AlreadyUsed`,
    /// `Cancelled`) come back as `Ok(ScanOutcome::Failure)`. An `Err` means
    /// the directory could not confirm either way; the caller decides
    /// whether to fall through to the offline engine.
    ///
    /// The directory's check-in endpoint is the linearization point: two
    /// simultaneous scans of the same code race there, and the loser
    /// observes `AlreadyUsed`.
    pub async fn check_in(&self, code: &str) -> Result<ScanOutcome, DirectoryError> {
        let record = match self.directory.lookup(code).await? {
            Some(record) => record,
            None => {
                debug!(code = code, "Online check-in: code not found");
                return Ok(ScanOutcome::failure(ScanFailure::NotFound));
            }
        };

        if record.event_id != self.event_id {
            debug!(
                code = code,
                ticket_event = %record.event_id,
                "Online check-in: ticket belongs to another event"
            );
            return Ok(ScanOutcome::failure(ScanFailure::WrongEvent));
        }

        match record.status {
            TicketStatus::Used => return Ok(ScanOutcome::failure(ScanFailure::AlreadyUsed)),
            TicketStatus::Cancelled => return Ok(ScanOutcome::failure(ScanFailure::Cancelled)),
            TicketStatus::Valid => {}
        }

        match self.directory.check_in(&record.id, Utc::now()).await? {
            CheckInOutcome::Accepted => {
                info!(code = code, "Ticket admitted online");
                CHECKINS_TOTAL.with_label_values(&["online"]).inc();

                if let Some(audit) = &self.audit {
                    audit
                        .emit(AuditEvent::CheckInAccepted {
                            event_id: self.event_id.clone(),
                            code: code.to_string(),
                            mode: "online".to_string(),
                        })
                        .await;
                }

                Ok(ScanOutcome::Success {
                    participant_name: record.participant_name,
                    ticket_category_name: record.ticket_category_name,
                    is_offline: false,
                })
            }
            // Lost the race against another scanner.
            CheckInOutcome::AlreadyUsed => {
                debug!(code = code, "Online check-in lost the transition race");
                Ok(ScanOutcome::failure(ScanFailure::AlreadyUsed))
            }
        }
    }
}

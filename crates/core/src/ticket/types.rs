//! Core ticket data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a ticket, as owned by the ticket directory service.
///
/// State machine:
/// ```text
/// valid -> used       (terminal, via online or synced-offline check-in)
/// valid -> cancelled  (terminal, externally driven)
/// ```
///
/// Both terminal states reject further check-in attempts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Valid,
    Used,
    Cancelled,
}

impl TicketStatus {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Used | TicketStatus::Cancelled)
    }

    /// Returns true if a check-in attempt can consume this ticket.
    pub fn can_check_in(&self) -> bool {
        matches!(self, TicketStatus::Valid)
    }

    /// Returns the status as a string (for storage and filtering).
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Valid => "valid",
            TicketStatus::Used => "used",
            TicketStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status from its storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "valid" => Some(TicketStatus::Valid),
            "used" => Some(TicketStatus::Used),
            "cancelled" => Some(TicketStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ticket as seen through the directory service's lookup operation.
///
/// The engine only ever reads this and requests a single valid->used
/// transition through the directory's atomic check-in operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketRecord {
    /// Directory-assigned identifier.
    pub id: String,
    /// Human-scannable code embedded in the QR payload
    /// (pattern `EVT-<base36>-<random4>`).
    pub code: String,
    /// Event this ticket belongs to.
    pub event_id: String,
    /// Current status.
    pub status: TicketStatus,
    /// Participant display name.
    pub participant_name: String,
    /// Ticket category display name, if the event uses categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_category_name: Option<String>,
    /// When the ticket was checked in (set on the valid->used transition).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// Reason a scan was rejected.
///
/// Per-scan failures are recovered locally and surfaced as data; they are
/// never propagated as crate errors, since a single bad scan must not
/// interrupt the check-in line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanFailure {
    /// The decoded text did not contain a ticket code.
    InvalidPayload,
    /// No ticket with this code exists (online), or the code is not in the
    /// local snapshot (offline).
    NotFound,
    /// The ticket belongs to a different event than the active one.
    WrongEvent,
    /// The ticket was already consumed.
    AlreadyUsed,
    /// The ticket was cancelled.
    Cancelled,
    /// A forced-online operation could not reach the directory service.
    NetworkUnavailable,
    /// Offline with no local snapshot; an offline download is required first.
    DownloadRequired,
    /// A pending admission was rejected because another source consumed the
    /// ticket first.
    SyncConflict,
    /// The local offline store is unreadable; treated as "no offline data".
    StorageCorruption,
}

impl ScanFailure {
    /// Returns the failure kind as a string (for logging and metrics labels).
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanFailure::InvalidPayload => "invalid_payload",
            ScanFailure::NotFound => "not_found",
            ScanFailure::WrongEvent => "wrong_event",
            ScanFailure::AlreadyUsed => "already_used",
            ScanFailure::Cancelled => "cancelled",
            ScanFailure::NetworkUnavailable => "network_unavailable",
            ScanFailure::DownloadRequired => "download_required",
            ScanFailure::SyncConflict => "sync_conflict",
            ScanFailure::StorageCorruption => "storage_corruption",
        }
    }
}

impl std::fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single scan. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The ticket was admitted.
    Success {
        participant_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ticket_category_name: Option<String>,
        /// True when the admission was made against the local snapshot and
        /// is not yet confirmed by the directory service.
        is_offline: bool,
    },
    /// The scan was rejected.
    Failure { kind: ScanFailure },
}

impl ScanOutcome {
    /// Build a failure outcome.
    pub fn failure(kind: ScanFailure) -> Self {
        ScanOutcome::Failure { kind }
    }

    /// Returns true if the guest was admitted.
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success { .. })
    }

    /// Returns the failure kind, if any.
    pub fn failure_kind(&self) -> Option<ScanFailure> {
        match self {
            ScanOutcome::Failure { kind } => Some(*kind),
            ScanOutcome::Success { .. } => None,
        }
    }

    /// Returns the outcome as a metrics/logging label.
    pub fn as_label(&self) -> &'static str {
        match self {
            ScanOutcome::Success { .. } => "success",
            ScanOutcome::Failure { kind } => kind.as_str(),
        }
    }
}

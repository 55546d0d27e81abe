//! Directory client data types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::TicketStatus;

/// Errors that can occur talking to the ticket directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DirectoryError {
    /// Returns true if the failure is a transport problem (the directory was
    /// unreachable or slow), as opposed to the service answering with an
    /// error. Transport failures are what the scan path falls back to the
    /// offline engine on.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DirectoryError::ConnectionFailed(_) | DirectoryError::Timeout
        )
    }
}

/// Result of the directory's atomic check-in operation.
///
/// The conditional valid->used transition either applies or reports that the
/// ticket was no longer consumable; the latter is data, not an error, because
/// the sync engine reconciles it rather than retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// The transition applied; this caller consumed the ticket.
    Accepted,
    /// Another source consumed the ticket first (or it is otherwise no
    /// longer valid).
    AlreadyUsed,
}

/// One ticket in an event snapshot fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotRow {
    pub code: String,
    pub status: TicketStatus,
    pub participant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_category_name: Option<String>,
}

//! Ticket directory service client.
//!
//! The directory service is the source of truth for ticket records. The
//! engine consumes exactly three operations from it: lookup by code, atomic
//! check-in, and snapshot fetch.

mod http;
mod types;

pub use http::HttpTicketDirectory;
pub use types::{CheckInOutcome, DirectoryError, SnapshotRow};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::ticket::TicketRecord;

/// The three operations the engine needs from the ticket directory service.
#[async_trait]
pub trait TicketDirectory: Send + Sync {
    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Look up a ticket by its scannable code.
    async fn lookup(&self, code: &str) -> Result<Option<TicketRecord>, DirectoryError>;

    /// Atomically transition a ticket valid->used, stamping the check-in
    /// timestamp. Two simultaneous calls for the same ticket must not both
    /// return [`CheckInOutcome::Accepted`]; the loser observes
    /// [`CheckInOutcome::AlreadyUsed`].
    async fn check_in(
        &self,
        ticket_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<CheckInOutcome, DirectoryError>;

    /// Fetch the full ticket list for an event, for offline use.
    async fn fetch_snapshot(&self, event_id: &str) -> Result<Vec<SnapshotRow>, DirectoryError>;
}

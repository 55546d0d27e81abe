//! Test doubles and fixtures.
//!
//! Everything here is compiled into the crate (not behind `cfg(test)`) so
//! integration tests and the server's test fixtures can use it too.

mod mock_directory;
mod mock_probe;

pub use mock_directory::{MockTicketDirectory, RecordedCheckIn};
pub use mock_probe::MockProbe;

/// Ticket fixtures for tests.
pub mod fixtures {
    use chrono::Utc;

    use crate::ticket::{TicketRecord, TicketStatus};

    fn ticket(code: &str, event_id: &str, name: &str, status: TicketStatus) -> TicketRecord {
        TicketRecord {
            id: format!("id-{}", code.to_ascii_lowercase()),
            code: code.to_string(),
            event_id: event_id.to_string(),
            status,
            participant_name: name.to_string(),
            ticket_category_name: Some("Standard".to_string()),
            checked_in_at: None,
        }
    }

    /// A valid, not-yet-consumed ticket.
    pub fn valid_ticket(code: &str, event_id: &str, name: &str) -> TicketRecord {
        ticket(code, event_id, name, TicketStatus::Valid)
    }

    /// A ticket that was already consumed.
    pub fn used_ticket(code: &str, event_id: &str, name: &str) -> TicketRecord {
        let mut record = ticket(code, event_id, name, TicketStatus::Used);
        record.checked_in_at = Some(Utc::now());
        record
    }

    /// A cancelled ticket.
    pub fn cancelled_ticket(code: &str, event_id: &str, name: &str) -> TicketRecord {
        ticket(code, event_id, name, TicketStatus::Cancelled)
    }
}

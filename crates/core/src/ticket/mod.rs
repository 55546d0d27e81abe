//! Ticket domain types shared across the engine.

mod types;

pub use types::{ScanFailure, ScanOutcome, TicketRecord, TicketStatus};

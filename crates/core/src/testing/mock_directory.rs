//! Mock ticket directory for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::directory::{CheckInOutcome, DirectoryError, SnapshotRow, TicketDirectory};
use crate::ticket::{TicketRecord, TicketStatus};

/// A recorded accepted check-in, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCheckIn {
    pub ticket_id: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

/// Mock implementation of the [`TicketDirectory`] trait.
///
/// Provides controllable behavior for testing:
/// - An in-memory ticket table with real atomic check-in semantics (the
///   valid->used transition happens under one lock, so concurrent callers
///   race exactly like they would against the real backend)
/// - Recorded accepted check-ins for assertions
/// - Simulated network failure, either outright (`set_offline`) or after a
///   number of successful check-ins (`fail_after_check_ins`, for mid-drain
///   interruption tests)
/// - Optional per-call latency to widen race windows in tests
pub struct MockTicketDirectory {
    /// Tickets keyed by code.
    tickets: RwLock<HashMap<String, TicketRecord>>,
    /// Accepted check-ins, in order.
    check_ins: RwLock<Vec<RecordedCheckIn>>,
    /// When true, every call fails with a transport error.
    offline: AtomicBool,
    /// `Some(n)`: allow n more check-in calls, then fail every call.
    failure_plan: Mutex<Option<u32>>,
    /// Artificial delay applied to every call.
    latency: Mutex<Option<Duration>>,
}

impl Default for MockTicketDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTicketDirectory {
    /// Create an empty mock directory.
    pub fn new() -> Self {
        Self {
            tickets: RwLock::new(HashMap::new()),
            check_ins: RwLock::new(Vec::new()),
            offline: AtomicBool::new(false),
            failure_plan: Mutex::new(None),
            latency: Mutex::new(None),
        }
    }

    /// Insert (or replace) a ticket.
    pub async fn insert_ticket(&self, record: TicketRecord) {
        self.tickets.write().await.insert(record.code.clone(), record);
    }

    /// Overwrite a ticket's status.
    pub async fn set_ticket_status(&self, code: &str, status: TicketStatus) {
        if let Some(ticket) = self.tickets.write().await.get_mut(code) {
            ticket.status = status;
        }
    }

    /// Current state of a ticket.
    pub async fn ticket(&self, code: &str) -> Option<TicketRecord> {
        self.tickets.read().await.get(code).cloned()
    }

    /// Accepted check-ins, in order.
    pub async fn recorded_check_ins(&self) -> Vec<RecordedCheckIn> {
        self.check_ins.read().await.clone()
    }

    /// Number of accepted check-ins.
    pub async fn checked_in_count(&self) -> usize {
        self.check_ins.read().await.len()
    }

    /// Make every call fail with a transport error (or stop doing so).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Allow `n` more check-in calls to complete, then fail every call with
    /// a transport error until [`clear_failure_plan`](Self::clear_failure_plan).
    pub fn fail_after_check_ins(&self, n: u32) {
        *self.failure_plan.lock().unwrap() = Some(n);
    }

    /// Remove any failure plan.
    pub fn clear_failure_plan(&self) {
        *self.failure_plan.lock().unwrap() = None;
    }

    /// Apply an artificial delay to every call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    async fn simulate_transport(&self) -> Result<(), DirectoryError> {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(DirectoryError::ConnectionFailed(
                "mock directory offline".to_string(),
            ));
        }

        if *self.failure_plan.lock().unwrap() == Some(0) {
            return Err(DirectoryError::ConnectionFailed(
                "mock network failure".to_string(),
            ));
        }

        Ok(())
    }

    fn consume_failure_budget(&self) {
        let mut plan = self.failure_plan.lock().unwrap();
        if let Some(n) = plan.as_mut() {
            *n = n.saturating_sub(1);
        }
    }
}

#[async_trait]
impl TicketDirectory for MockTicketDirectory {
    fn name(&self) -> &str {
        "mock"
    }

    async fn lookup(&self, code: &str) -> Result<Option<TicketRecord>, DirectoryError> {
        self.simulate_transport().await?;
        Ok(self.tickets.read().await.get(code).cloned())
    }

    async fn check_in(
        &self,
        ticket_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<CheckInOutcome, DirectoryError> {
        self.simulate_transport().await?;

        // Single write lock around the conditional transition: this is the
        // atomicity the real backend provides.
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .values_mut()
            .find(|t| t.id == ticket_id)
            .ok_or_else(|| DirectoryError::ApiError(format!("unknown ticket id {}", ticket_id)))?;

        let outcome = if ticket.status.can_check_in() {
            ticket.status = TicketStatus::Used;
            ticket.checked_in_at = Some(timestamp);
            self.check_ins.write().await.push(RecordedCheckIn {
                ticket_id: ticket_id.to_string(),
                code: ticket.code.clone(),
                timestamp,
            });
            CheckInOutcome::Accepted
        } else {
            CheckInOutcome::AlreadyUsed
        };

        self.consume_failure_budget();
        Ok(outcome)
    }

    async fn fetch_snapshot(&self, event_id: &str) -> Result<Vec<SnapshotRow>, DirectoryError> {
        self.simulate_transport().await?;

        let tickets = self.tickets.read().await;
        let mut rows: Vec<SnapshotRow> = tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .map(|t| SnapshotRow {
                code: t.code.clone(),
                status: t.status,
                participant_name: t.participant_name.clone(),
                ticket_category_name: t.ticket_category_name.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    const EVENT: &str = "e-1";

    #[tokio::test]
    async fn test_lookup() {
        let directory = MockTicketDirectory::new();
        directory
            .insert_ticket(fixtures::valid_ticket("EVT-ABC123-XY12", EVENT, "Ada"))
            .await;

        let found = directory.lookup("EVT-ABC123-XY12").await.unwrap();
        assert!(found.is_some());

        let missing = directory.lookup("EVT-NOPE00-0000").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_check_in_is_conditional() {
        let directory = MockTicketDirectory::new();
        let ticket = fixtures::valid_ticket("EVT-ABC123-XY12", EVENT, "Ada");
        let id = ticket.id.clone();
        directory.insert_ticket(ticket).await;

        let first = directory.check_in(&id, Utc::now()).await.unwrap();
        assert_eq!(first, CheckInOutcome::Accepted);

        let second = directory.check_in(&id, Utc::now()).await.unwrap();
        assert_eq!(second, CheckInOutcome::AlreadyUsed);

        assert_eq!(directory.checked_in_count().await, 1);
    }

    #[tokio::test]
    async fn test_offline_simulation() {
        let directory = MockTicketDirectory::new();
        directory.set_offline(true);

        let result = directory.lookup("EVT-ABC123-XY12").await;
        assert!(matches!(result, Err(DirectoryError::ConnectionFailed(_))));

        directory.set_offline(false);
        assert!(directory.lookup("EVT-ABC123-XY12").await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_plan() {
        let directory = MockTicketDirectory::new();
        let ticket = fixtures::valid_ticket("EVT-ABC123-XY12", EVENT, "Ada");
        let id = ticket.id.clone();
        directory.insert_ticket(ticket).await;

        directory.fail_after_check_ins(1);

        // One check-in goes through, then everything fails.
        assert!(directory.lookup("EVT-ABC123-XY12").await.is_ok());
        assert!(directory.check_in(&id, Utc::now()).await.is_ok());
        assert!(directory.lookup("EVT-ABC123-XY12").await.is_err());
        assert!(directory.check_in(&id, Utc::now()).await.is_err());

        directory.clear_failure_plan();
        assert!(directory.lookup("EVT-ABC123-XY12").await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_snapshot_is_event_scoped() {
        let directory = MockTicketDirectory::new();
        directory
            .insert_ticket(fixtures::valid_ticket("EVT-ABC123-XY12", EVENT, "Ada"))
            .await;
        directory
            .insert_ticket(fixtures::valid_ticket("EVT-OTHER0-0001", "e-2", "Grace"))
            .await;

        let rows = directory.fetch_snapshot(EVENT).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, "EVT-ABC123-XY12");
    }
}

//! Orchestrator data types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::scanner::ScannerError;

/// Errors from orchestrator lifecycle operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Scanning is already running")]
    AlreadyRunning,

    #[error("Scanning is not running")]
    NotRunning,

    #[error(transparent)]
    Scanner(#[from] ScannerError),
}

/// Observable state for the UI layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusSnapshot {
    pub is_online: bool,
    pub is_scanning: bool,
    pub has_offline_data: bool,
    pub offline_ticket_count: usize,
    pub pending_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_download: Option<DateTime<Utc>>,
}

//! HTTP implementation of the ticket directory client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::metrics::{DIRECTORY_REQUESTS, DIRECTORY_REQUEST_DURATION};
use crate::ticket::TicketRecord;

use super::{CheckInOutcome, DirectoryError, SnapshotRow, TicketDirectory};

/// Ticket directory client over HTTP/JSON.
///
/// All requests carry the configured timeout; the engine never issues an
/// unbounded network call.
pub struct HttpTicketDirectory {
    client: Client,
    config: DirectoryConfig,
}

#[derive(Debug, Serialize)]
struct CheckInBody {
    timestamp: DateTime<Utc>,
}

impl HttpTicketDirectory {
    /// Create a new client with the given configuration.
    pub fn new(config: DirectoryConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// URL of the directory's health endpoint (used by the connectivity probe).
    pub fn health_url(&self) -> String {
        self.url("/api/v1/health")
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("X-Api-Key", key),
            None => request,
        }
    }

    fn map_transport_error(e: reqwest::Error) -> DirectoryError {
        if e.is_timeout() {
            DirectoryError::Timeout
        } else if e.is_connect() {
            DirectoryError::ConnectionFailed(e.to_string())
        } else {
            DirectoryError::ApiError(e.to_string())
        }
    }

    async fn error_body(response: reqwest::Response) -> DirectoryError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        DirectoryError::ApiError(format!(
            "HTTP {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        ))
    }

    fn observe(operation: &str, start: Instant, result: &str) {
        DIRECTORY_REQUESTS
            .with_label_values(&[operation, result])
            .inc();
        DIRECTORY_REQUEST_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
    }
}

#[async_trait]
impl TicketDirectory for HttpTicketDirectory {
    fn name(&self) -> &str {
        "http"
    }

    async fn lookup(&self, code: &str) -> Result<Option<TicketRecord>, DirectoryError> {
        let start = Instant::now();
        let url = self.url(&format!(
            "/api/v1/tickets/code/{}",
            urlencoding::encode(code)
        ));
        debug!(code = code, "Looking up ticket");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                Self::observe("lookup", start, "error");
                Self::map_transport_error(e)
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            Self::observe("lookup", start, "success");
            return Ok(None);
        }

        if !response.status().is_success() {
            Self::observe("lookup", start, "error");
            return Err(Self::error_body(response).await);
        }

        let record: TicketRecord = response.json().await.map_err(|e| {
            Self::observe("lookup", start, "error");
            DirectoryError::InvalidResponse(e.to_string())
        })?;

        Self::observe("lookup", start, "success");
        Ok(Some(record))
    }

    async fn check_in(
        &self,
        ticket_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<CheckInOutcome, DirectoryError> {
        let start = Instant::now();
        let url = self.url(&format!(
            "/api/v1/tickets/{}/check-in",
            urlencoding::encode(ticket_id)
        ));
        debug!(ticket_id = ticket_id, "Submitting check-in");

        let response = self
            .authorize(self.client.post(&url))
            .json(&CheckInBody { timestamp })
            .send()
            .await
            .map_err(|e| {
                Self::observe("check_in", start, "error");
                Self::map_transport_error(e)
            })?;

        // 409 is the conditional transition losing, not a protocol error.
        if response.status() == StatusCode::CONFLICT {
            Self::observe("check_in", start, "conflict");
            return Ok(CheckInOutcome::AlreadyUsed);
        }

        if !response.status().is_success() {
            Self::observe("check_in", start, "error");
            return Err(Self::error_body(response).await);
        }

        Self::observe("check_in", start, "success");
        Ok(CheckInOutcome::Accepted)
    }

    async fn fetch_snapshot(&self, event_id: &str) -> Result<Vec<SnapshotRow>, DirectoryError> {
        let start = Instant::now();
        let url = self.url(&format!(
            "/api/v1/events/{}/tickets",
            urlencoding::encode(event_id)
        ));
        debug!(event_id = event_id, "Fetching event snapshot");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                Self::observe("fetch_snapshot", start, "error");
                Self::map_transport_error(e)
            })?;

        if !response.status().is_success() {
            Self::observe("fetch_snapshot", start, "error");
            return Err(Self::error_body(response).await);
        }

        let rows: Vec<SnapshotRow> = response.json().await.map_err(|e| {
            Self::observe("fetch_snapshot", start, "error");
            DirectoryError::InvalidResponse(e.to_string())
        })?;

        debug!(
            event_id = event_id,
            tickets = rows.len(),
            "Snapshot fetch complete"
        );

        Self::observe("fetch_snapshot", start, "success");
        Ok(rows)
    }
}

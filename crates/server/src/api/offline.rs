//! Offline data API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use turnstile_core::{SnapshotError, SnapshotInfo};

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct OfflineErrorResponse {
    pub error: String,
}

/// Response for a completed download
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub event_id: String,
    pub ticket_count: usize,
    pub downloaded_at: String,
}

impl From<SnapshotInfo> for DownloadResponse {
    fn from(info: SnapshotInfo) -> Self {
        Self {
            event_id: info.event_id,
            ticket_count: info.ticket_count,
            downloaded_at: info.downloaded_at.to_rfc3339(),
        }
    }
}

/// Response for a cleared snapshot
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub event_id: String,
    /// Unsynced admissions discarded with the snapshot. Nonzero means
    /// admissions the backend will never hear about.
    pub dropped_pending: usize,
}

/// Download (or replace) the offline snapshot for the active event.
pub async fn download(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DownloadResponse>, impl IntoResponse> {
    match state.snapshots().download().await {
        Ok(info) => Ok(Json(DownloadResponse::from(info))),
        Err(e @ SnapshotError::NetworkUnavailable(_)) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(OfflineErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(OfflineErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Clear the offline snapshot and any unsynced pending admissions.
pub async fn clear(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, impl IntoResponse> {
    match state.snapshots().clear() {
        Ok(cleared) => Ok(Json(ClearResponse {
            event_id: cleared.event_id,
            dropped_pending: cleared.dropped_pending,
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(OfflineErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

//! Sync API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use turnstile_core::{SyncError, SyncReport};

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct SyncErrorResponse {
    pub error: String,
}

/// Response for the pending-count query
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub pending_count: usize,
    pub is_syncing: bool,
}

/// Drain the pending offline admissions against the directory service.
pub async fn sync_now(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncReport>, impl IntoResponse> {
    match state.sync().sync_pending().await {
        Ok(report) => Ok(Json(report)),
        Err(e @ SyncError::InProgress) => Err((
            StatusCode::CONFLICT,
            Json(SyncErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e @ SyncError::NetworkUnavailable(_)) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(SyncErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SyncErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Current queue depth; callable at any time, including mid-drain, to drive
/// progress UI.
pub async fn pending(State(state): State<Arc<AppState>>) -> Json<PendingResponse> {
    Json(PendingResponse {
        pending_count: state.sync().pending_count(),
        is_syncing: state.sync().is_syncing(),
    })
}

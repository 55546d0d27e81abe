//! Scan API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use turnstile_core::{OrchestratorError, ScanOutcome};

use crate::state::AppState;

/// Request body for submitting a scan
#[derive(Debug, Deserialize)]
pub struct ScanBody {
    /// Raw decoded QR payload text.
    pub payload: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ScanErrorResponse {
    pub error: String,
}

/// Response for scanner lifecycle operations
#[derive(Debug, Serialize)]
pub struct ScannerStateResponse {
    pub is_scanning: bool,
}

/// Response for pushed frames
#[derive(Debug, Serialize)]
pub struct FrameResponse {
    /// False when the frame was dropped (scanner not started or stream full).
    pub accepted: bool,
}

/// Submit one scan and wait for its outcome.
///
/// Returns 429 when a scan is already in flight; a decoder re-emitting the
/// same code must not cause a duplicate admission, so concurrent submissions
/// are dropped rather than queued.
pub async fn submit_scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScanBody>,
) -> Result<Json<ScanOutcome>, impl IntoResponse> {
    match state.orchestrator().process_scan(&body.payload).await {
        Some(outcome) => Ok(Json(outcome)),
        None => Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ScanErrorResponse {
                error: "A scan is already being processed".to_string(),
            }),
        )),
    }
}

/// Start the scan session (begin consuming decoder frames).
pub async fn start_scanning(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScannerStateResponse>, impl IntoResponse> {
    match state.orchestrator().start().await {
        Ok(()) => Ok(Json(ScannerStateResponse { is_scanning: true })),
        Err(e @ OrchestratorError::AlreadyRunning) => Err((
            StatusCode::CONFLICT,
            Json(ScanErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ScanErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Stop the scan session.
pub async fn stop_scanning(State(state): State<Arc<AppState>>) -> Json<ScannerStateResponse> {
    state.orchestrator().stop().await;
    Json(ScannerStateResponse { is_scanning: false })
}

/// Push one decoded frame into the running scan session, fire-and-forget.
///
/// This is the streaming counterpart of [`submit_scan`] for UIs that relay
/// the decoder output continuously; outcomes surface through the session's
/// outcome stream, the audit log and metrics.
pub async fn push_frame(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScanBody>,
) -> (StatusCode, Json<FrameResponse>) {
    let accepted = state.scanner().push(&body.payload).await;
    let status = if accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(FrameResponse { accepted }))
}

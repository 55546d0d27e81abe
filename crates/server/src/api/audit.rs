//! Audit query API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use turnstile_core::{AuditFilter, AuditRecord, AuditStore};

use crate::state::AppState;

/// Maximum allowed limit for audit queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for audit queries
const DEFAULT_LIMIT: i64 = 100;

/// Query parameters for listing audit records
#[derive(Debug, Deserialize)]
pub struct AuditParams {
    /// Filter by event type (e.g. "sync_conflict")
    pub event_type: Option<String>,
    /// Filter by ticket code
    pub code: Option<String>,
    /// Maximum number of records to return
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

/// Response for audit queries
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub records: Vec<AuditRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct AuditErrorResponse {
    pub error: String,
}

/// Query the audit log. `event_type=sync_conflict` is the batch conflict
/// report for manual follow-up.
pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditParams>,
) -> Result<Json<AuditResponse>, impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = AuditFilter::new().with_limit(limit).with_offset(offset);
    if let Some(event_type) = params.event_type {
        filter = filter.with_event_type(event_type);
    }
    if let Some(code) = params.code {
        filter = filter.with_code(code);
    }

    let total = match state.audit_store().count(&filter) {
        Ok(total) => total,
        Err(e) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuditErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    };

    match state.audit_store().query(&filter) {
        Ok(records) => Ok(Json(AuditResponse {
            records,
            total,
            limit,
            offset,
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AuditErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

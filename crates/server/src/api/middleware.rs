//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use turnstile_core::{AuthError, AuthRequest, Authenticator, Identity};

use crate::metrics::{AUTH_FAILURES_TOTAL, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Authentication middleware that validates requests using the configured
/// authenticator. Failed authentication returns 401 Unauthorized.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let authenticator = state.authenticator();

    // Extract headers into a map for the authenticator
    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    let auth_request = AuthRequest { headers };

    match authenticator.authenticate(&auth_request).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(e) => {
            let reason = match &e {
                AuthError::NotAuthenticated => "missing_credentials",
                AuthError::InvalidCredentials(_) => "invalid_credentials",
                AuthError::ConfigurationError(_) => "configuration",
            };
            AUTH_FAILURES_TOTAL.with_label_values(&[reason]).inc();
            tracing::debug!("Authentication failed: {}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request information for authentication
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
}

/// Authenticated station identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub station: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            station: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }
}

//! Connectivity probing.
//!
//! The orchestrator consults the probe per scan to choose the online or
//! offline strategy; the snapshot manager and sync engine consult it before
//! forced-online operations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Answers "can we reach the ticket directory right now?".
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Probes connectivity with a bounded-timeout request against the directory
/// service's health endpoint.
///
/// The short timeout is the point: flaky-but-not-down connectivity must
/// resolve to a strategy decision quickly instead of hanging a scan.
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    /// Create a probe against the given health URL.
    pub fn new(url: impl Into<String>, timeout_secs: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn is_online(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Connectivity probe failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_offline() {
        // Reserved TEST-NET address; nothing listens there.
        let probe = HttpProbe::new("http://192.0.2.1:9/health", 1);
        assert!(!probe.is_online().await);
    }
}

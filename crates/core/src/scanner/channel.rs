//! Channel-backed scanner.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{CodeScanner, ScannerError};

/// Channel capacity for pushed frames.
const FRAME_BUFFER: usize = 64;

/// Scanner fed by whatever transport delivers decoded payloads: an HTTP
/// endpoint, a WebSocket, or an embedded decoder thread. Also the scripted
/// decoder used in tests.
pub struct ChannelScanner {
    tx: Mutex<Option<mpsc::Sender<String>>>,
}

impl Default for ChannelScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelScanner {
    pub fn new() -> Self {
        Self {
            tx: Mutex::new(None),
        }
    }

    /// True while started.
    pub fn is_started(&self) -> bool {
        self.tx.lock().unwrap().is_some()
    }

    /// Push one decoded payload into the stream, as the camera would.
    /// Returns false (dropping the frame) when the scanner is not started.
    pub async fn push(&self, raw: &str) -> bool {
        let tx = self.tx.lock().unwrap().clone();
        match tx {
            Some(tx) => tx.send(raw.to_string()).await.is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl CodeScanner for ChannelScanner {
    fn name(&self) -> &str {
        "channel"
    }

    async fn start(&self) -> Result<mpsc::Receiver<String>, ScannerError> {
        let mut guard = self.tx.lock().unwrap();
        if guard.is_some() {
            return Err(ScannerError::AlreadyRunning);
        }

        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        *guard = Some(tx);
        Ok(rx)
    }

    async fn stop(&self) {
        // Dropping the sender ends the frame stream.
        self.tx.lock().unwrap().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_push_stop() {
        let scanner = ChannelScanner::new();
        assert!(!scanner.is_started());

        let mut rx = scanner.start().await.unwrap();
        assert!(scanner.is_started());

        assert!(scanner.push("EVT-ABC123-XY12").await);
        assert_eq!(rx.recv().await.as_deref(), Some("EVT-ABC123-XY12"));

        scanner.stop().await;
        assert!(!scanner.is_started());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let scanner = ChannelScanner::new();
        let _rx = scanner.start().await.unwrap();

        assert!(matches!(
            scanner.start().await,
            Err(ScannerError::AlreadyRunning)
        ));
    }

    #[tokio::test]
    async fn test_push_before_start_is_dropped() {
        let scanner = ChannelScanner::new();
        assert!(!scanner.push("EVT-ABC123-XY12").await);
    }
}

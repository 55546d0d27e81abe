//! Decoder capability interface.
//!
//! Camera access and QR frame decoding live behind this narrow trait so the
//! check-in logic never depends on a specific decoding library's types. A
//! decoder may re-emit the same payload many times per second while a code
//! is held in frame; the orchestrator, not the decoder, is responsible for
//! de-duplicating that.

mod channel;

pub use channel::ChannelScanner;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from the decoding capability.
#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("Scanner failed to start: {0}")]
    StartFailed(String),

    #[error("Scanner is already running")]
    AlreadyRunning,
}

/// An opaque source of decoded QR payload text.
#[async_trait]
pub trait CodeScanner: Send + Sync {
    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Start decoding. Returns the stream of raw decoded payloads; the
    /// stream ends when [`stop`](Self::stop) is called or the decoder shuts
    /// down on its own.
    async fn start(&self) -> Result<mpsc::Receiver<String>, ScannerError>;

    /// Stop decoding and end the payload stream.
    async fn stop(&self);
}

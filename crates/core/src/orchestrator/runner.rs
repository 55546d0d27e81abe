//! Scan orchestrator implementation.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::checkin::{OfflineEngine, OnlineValidator};
use crate::connectivity::ConnectivityProbe;
use crate::extractor::extract_code;
use crate::metrics::SCANS_TOTAL;
use crate::scanner::CodeScanner;
use crate::snapshot::SnapshotManager;
use crate::ticket::{ScanFailure, ScanOutcome};

use super::session::ScanSession;
use super::types::{OrchestratorError, StatusSnapshot};

/// Buffer for the outcome broadcast channel; the UI only ever wants the
/// most recent outcomes.
const OUTCOME_BUFFER: usize = 16;

/// Chooses the per-scan strategy and drives the decoder stream.
pub struct ScanOrchestrator {
    online: Arc<OnlineValidator>,
    offline: Arc<OfflineEngine>,
    snapshots: Arc<SnapshotManager>,
    probe: Arc<dyn ConnectivityProbe>,
    scanner: Arc<dyn CodeScanner>,
    session: Arc<ScanSession>,
    outcome_tx: broadcast::Sender<ScanOutcome>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ScanOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        online: Arc<OnlineValidator>,
        offline: Arc<OfflineEngine>,
        snapshots: Arc<SnapshotManager>,
        probe: Arc<dyn ConnectivityProbe>,
        scanner: Arc<dyn CodeScanner>,
    ) -> Self {
        let (outcome_tx, _) = broadcast::channel(OUTCOME_BUFFER);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            online,
            offline,
            snapshots,
            probe,
            scanner,
            session: Arc::new(ScanSession::new()),
            outcome_tx,
            shutdown_tx,
        }
    }

    /// The session state object (shared with the decoder loop).
    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    /// Subscribe to outcomes produced by the decoder loop.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<ScanOutcome> {
        self.outcome_tx.subscribe()
    }

    /// Start consuming the decoder stream.
    pub async fn start(&self) -> Result<(), OrchestratorError> {
        if !self.session.begin_scanning() {
            return Err(OrchestratorError::AlreadyRunning);
        }

        let mut rx = match self.scanner.start().await {
            Ok(rx) => rx,
            Err(e) => {
                self.session.end_scanning();
                return Err(e.into());
            }
        };

        info!(scanner = self.scanner.name(), "Scanning started");

        let online = Arc::clone(&self.online);
        let offline = Arc::clone(&self.offline);
        let snapshots = Arc::clone(&self.snapshots);
        let probe = Arc::clone(&self.probe);
        let session = Arc::clone(&self.session);
        let outcome_tx = self.outcome_tx.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Scan loop received shutdown signal");
                        break;
                    }
                    frame = rx.recv() => {
                        match frame {
                            Some(raw) => {
                                let outcome = Self::process(
                                    &raw, &session, &online, &offline, &snapshots, probe.as_ref(),
                                )
                                .await;
                                if let Some(outcome) = outcome {
                                    // Nobody listening is fine.
                                    let _ = outcome_tx.send(outcome);
                                }
                            }
                            None => {
                                info!("Decoder stream ended");
                                session.end_scanning();
                                break;
                            }
                        }
                    }
                }
            }
            debug!("Scan loop stopped");
        });

        Ok(())
    }

    /// Stop consuming the decoder stream.
    pub async fn stop(&self) {
        if !self.session.is_scanning() {
            warn!("Scanning not running");
            return;
        }

        self.session.end_scanning();
        let _ = self.shutdown_tx.send(());
        self.scanner.stop().await;

        info!("Scanning stopped");
    }

    /// Process one raw decoded payload.
    ///
    /// Returns `None` when the frame was dropped because another scan is
    /// still in flight. This is the single-in-flight discipline that keeps a code
    /// held steady in frame from being admitted twice.
    pub async fn process_scan(&self, raw: &str) -> Option<ScanOutcome> {
        Self::process(
            raw,
            &self.session,
            &self.online,
            &self.offline,
            &self.snapshots,
            self.probe.as_ref(),
        )
        .await
    }

    async fn process(
        raw: &str,
        session: &ScanSession,
        online: &OnlineValidator,
        offline: &OfflineEngine,
        snapshots: &SnapshotManager,
        probe: &dyn ConnectivityProbe,
    ) -> Option<ScanOutcome> {
        // The permit covers the whole validation, network round-trips
        // included; frames arriving meanwhile are dropped, not queued.
        let Some(_permit) = session.try_begin_processing() else {
            debug!("Dropped frame: scan already in flight");
            return None;
        };

        let outcome = match extract_code(raw) {
            None => ScanOutcome::failure(ScanFailure::InvalidPayload),
            Some(code) => {
                let has_offline = snapshots.has_snapshot();

                if probe.is_online().await {
                    match online.check_in(&code).await {
                        Ok(outcome) => outcome,
                        Err(e) if has_offline => {
                            // Unconfirmed admission: the directory could not
                            // answer, so fall through to the snapshot.
                            warn!(
                                code = %code,
                                "Directory unreachable mid-scan, falling back to offline: {}",
                                e
                            );
                            offline.check_in(&code)
                        }
                        Err(e) => {
                            warn!(code = %code, "Directory unreachable mid-scan: {}", e);
                            ScanOutcome::failure(ScanFailure::NetworkUnavailable)
                        }
                    }
                } else if has_offline {
                    offline.check_in(&code)
                } else {
                    ScanOutcome::failure(ScanFailure::DownloadRequired)
                }
            }
        };

        SCANS_TOTAL.with_label_values(&[outcome.as_label()]).inc();
        Some(outcome)
    }

    /// Observable state for the UI layer.
    pub async fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            is_online: self.probe.is_online().await,
            is_scanning: self.session.is_scanning(),
            has_offline_data: self.snapshots.has_snapshot(),
            offline_ticket_count: self.snapshots.ticket_count(),
            pending_count: self.snapshots.pending_count(),
            last_download: self.snapshots.last_download_time(),
        }
    }
}

use std::sync::Arc;

use turnstile_core::{
    AuditHandle, AuditStore, Authenticator, ChannelScanner, Config, SanitizedConfig,
    ScanOrchestrator, SnapshotManager, SyncEngine,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    audit: AuditHandle,
    audit_store: Arc<dyn AuditStore>,
    orchestrator: Arc<ScanOrchestrator>,
    snapshots: Arc<SnapshotManager>,
    sync: Arc<SyncEngine>,
    scanner: Arc<ChannelScanner>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        audit: AuditHandle,
        audit_store: Arc<dyn AuditStore>,
        orchestrator: Arc<ScanOrchestrator>,
        snapshots: Arc<SnapshotManager>,
        sync: Arc<SyncEngine>,
        scanner: Arc<ChannelScanner>,
    ) -> Self {
        Self {
            config,
            authenticator,
            audit,
            audit_store,
            orchestrator,
            snapshots,
            sync,
            scanner,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn audit(&self) -> &AuditHandle {
        &self.audit
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    pub fn orchestrator(&self) -> &ScanOrchestrator {
        &self.orchestrator
    }

    pub fn snapshots(&self) -> &SnapshotManager {
        &self.snapshots
    }

    pub fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    pub fn scanner(&self) -> &ChannelScanner {
        &self.scanner
    }
}

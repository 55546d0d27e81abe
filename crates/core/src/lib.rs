//! Offline-resilient event ticket check-in engine.
//!
//! Decides whether a scan is valid, consumes a ticket exactly once, and
//! reconciles admissions made by multiple independent, possibly offline,
//! scanning devices once connectivity returns.

pub mod audit;
pub mod auth;
pub mod checkin;
pub mod config;
pub mod connectivity;
pub mod directory;
pub mod extractor;
pub mod metrics;
pub mod orchestrator;
pub mod scanner;
pub mod snapshot;
pub mod sync;
pub mod testing;
pub mod ticket;

pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditFilter, AuditHandle, AuditRecord,
    AuditStore, AuditWriter, SqliteAuditStore,
};
pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use checkin::{OfflineEngine, OnlineValidator};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, ConnectivityConfig, DatabaseConfig, DirectoryConfig, EventConfig, SanitizedConfig,
    ServerConfig, SyncConfig,
};
pub use connectivity::{ConnectivityProbe, HttpProbe};
pub use directory::{
    CheckInOutcome, DirectoryError, HttpTicketDirectory, SnapshotRow, TicketDirectory,
};
pub use extractor::extract_code;
pub use orchestrator::{
    OrchestratorError, ScanOrchestrator, ScanPermit, ScanSession, StatusSnapshot,
};
pub use scanner::{ChannelScanner, CodeScanner, ScannerError};
pub use snapshot::{
    ClearedSnapshot, PendingCheckIn, SnapshotEntry, SnapshotError, SnapshotInfo, SnapshotManager,
    SnapshotStore, SqliteSnapshotStore,
};
pub use sync::{ConflictPolicy, SyncConflict, SyncEngine, SyncError, SyncReport};
pub use ticket::{ScanFailure, ScanOutcome, TicketRecord, TicketStatus};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnstile_core::{
    create_audit_system, create_authenticator, load_config, validate_config, AuditEvent,
    AuditStore, Authenticator, ChannelScanner, CodeScanner, ConnectivityProbe, HttpProbe,
    HttpTicketDirectory, OfflineEngine, OnlineValidator, ScanOrchestrator, SnapshotManager,
    SnapshotStore, SqliteAuditStore, SqliteSnapshotStore, SyncEngine, TicketDirectory,
};

use turnstile_server::api::create_router;
use turnstile_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TURNSTILE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Event: {}", config.event.id);
    info!("Directory service: {}", config.directory.url);
    info!("Database path: {:?}", config.database.path);

    // Compute config hash for audit
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite audit store
    let audit_store: Arc<dyn AuditStore> = Arc::new(
        SqliteAuditStore::new(&config.database.path).context("Failed to create audit store")?,
    );
    info!("Audit store initialized");

    // Create SQLite snapshot store
    let snapshot_store: Arc<dyn SnapshotStore> = Arc::new(
        SqliteSnapshotStore::new(&config.database.path)
            .context("Failed to create snapshot store")?,
    );
    info!("Snapshot store initialized");

    // Create audit system
    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);

    // Spawn audit writer task
    let writer_handle = tokio::spawn(audit_writer.run());

    // Emit ServiceStarted event
    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;

    // Create directory client and connectivity probe
    let directory_client = HttpTicketDirectory::new(config.directory.clone());
    let probe: Arc<dyn ConnectivityProbe> = Arc::new(HttpProbe::new(
        directory_client.health_url(),
        config.connectivity.timeout_secs,
    ));
    let directory: Arc<dyn TicketDirectory> = Arc::new(directory_client);
    info!("Directory client initialized");

    // Decoder bridge: the UI pushes decoded frames through the API
    let scanner = Arc::new(ChannelScanner::new());

    // Create engines
    let event_id = config.event.id.clone();
    let snapshots = Arc::new(
        SnapshotManager::new(
            event_id.clone(),
            Arc::clone(&snapshot_store),
            Arc::clone(&directory),
            Arc::clone(&probe),
        )
        .with_audit(audit_handle.clone()),
    );
    let online = Arc::new(
        OnlineValidator::new(event_id.clone(), Arc::clone(&directory))
            .with_audit(audit_handle.clone()),
    );
    let offline = Arc::new(
        OfflineEngine::new(event_id.clone(), Arc::clone(&snapshot_store))
            .with_audit(audit_handle.clone()),
    );
    let sync = Arc::new(
        SyncEngine::new(
            event_id.clone(),
            Arc::clone(&snapshot_store),
            Arc::clone(&directory),
            Arc::clone(&probe),
            config.sync.conflict_policy,
        )
        .with_audit(audit_handle.clone()),
    );

    // Create orchestrator
    let orchestrator = Arc::new(ScanOrchestrator::new(
        online,
        offline,
        Arc::clone(&snapshots),
        Arc::clone(&probe),
        Arc::clone(&scanner) as Arc<dyn CodeScanner>,
    ));
    info!("Scan orchestrator initialized");

    // Create app state
    let app_state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        audit_handle.clone(),
        audit_store,
        Arc::clone(&orchestrator),
        snapshots,
        sync,
        scanner,
    ));

    // Create router
    let app = create_router(app_state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop scanning if it is still running
    if orchestrator.session().is_scanning() {
        info!("Stopping scan session...");
        orchestrator.stop().await;
    }

    // Emit ServiceStopped event
    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // Drop all holders of AuditHandle so the writer's channel closes.
    // The engines inside the orchestrator and app state hold clones, but
    // both were dropped with the router; only our locals remain.
    drop(orchestrator);
    drop(audit_handle);

    // Wait for writer to finish processing remaining events
    let _ = writer_handle.await;
    info!("Audit writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

//! Common test utilities for E2E testing with mocks.
//!
//! Provides an in-process server with mock directory and connectivity
//! injected, enabling full check-in flows without external infrastructure.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use turnstile_core::{
    create_audit_system, create_authenticator, AuditStore, AuthConfig, AuthMethod, ChannelScanner,
    CodeScanner, Config, ConnectivityConfig, ConnectivityProbe, DatabaseConfig, DirectoryConfig,
    EventConfig, OfflineEngine, OnlineValidator, ScanOrchestrator, ServerConfig, SnapshotManager,
    SnapshotStore, SqliteAuditStore, SqliteSnapshotStore, SyncConfig, SyncEngine, TicketDirectory,
};
use turnstile_server::api::create_router;
use turnstile_server::state::AppState;

/// Re-export fixtures and mocks for test convenience
pub use turnstile_core::testing::{fixtures, MockProbe, MockTicketDirectory};

/// The event every fixture serves.
pub const EVENT: &str = "e-1";

/// Test configuration knobs.
#[derive(Default)]
pub struct TestConfig {
    /// When set, the device API requires this key.
    pub api_key: Option<String>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// In-process server with controllable mocks.
pub struct TestFixture {
    pub router: Router,
    pub directory: Arc<MockTicketDirectory>,
    pub probe: Arc<MockProbe>,
    pub scanner: Arc<ChannelScanner>,
    #[allow(dead_code)]
    pub temp_dir: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with default configuration.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            event: EventConfig {
                id: EVENT.to_string(),
            },
            directory: DirectoryConfig {
                // Never contacted; the mock stands in for the client.
                url: "http://directory.test".to_string(),
                api_key: None,
                timeout_secs: 1,
            },
            auth: AuthConfig {
                method: if test_config.api_key.is_some() {
                    AuthMethod::ApiKey
                } else {
                    AuthMethod::None
                },
                api_key: test_config.api_key,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            sync: SyncConfig::default(),
            connectivity: ConnectivityConfig::default(),
        };

        let directory_mock = Arc::new(MockTicketDirectory::new());
        let probe_mock = Arc::new(MockProbe::online());
        let scanner = Arc::new(ChannelScanner::new());

        let directory: Arc<dyn TicketDirectory> = Arc::clone(&directory_mock) as _;
        let probe: Arc<dyn ConnectivityProbe> = Arc::clone(&probe_mock) as _;

        let audit_store: Arc<dyn AuditStore> =
            Arc::new(SqliteAuditStore::new(&db_path).expect("Failed to create audit store"));
        let snapshot_store: Arc<dyn SnapshotStore> = Arc::new(
            SqliteSnapshotStore::new(&db_path).expect("Failed to create snapshot store"),
        );

        let (audit_handle, writer) = create_audit_system(Arc::clone(&audit_store), 100);
        tokio::spawn(writer.run());

        let snapshots = Arc::new(
            SnapshotManager::new(
                EVENT,
                Arc::clone(&snapshot_store),
                Arc::clone(&directory),
                Arc::clone(&probe),
            )
            .with_audit(audit_handle.clone()),
        );
        let online = Arc::new(
            OnlineValidator::new(EVENT, Arc::clone(&directory)).with_audit(audit_handle.clone()),
        );
        let offline = Arc::new(
            OfflineEngine::new(EVENT, Arc::clone(&snapshot_store))
                .with_audit(audit_handle.clone()),
        );
        let sync = Arc::new(
            SyncEngine::new(
                EVENT,
                Arc::clone(&snapshot_store),
                Arc::clone(&directory),
                Arc::clone(&probe),
                config.sync.conflict_policy,
            )
            .with_audit(audit_handle.clone()),
        );
        let orchestrator = Arc::new(ScanOrchestrator::new(
            online,
            offline,
            Arc::clone(&snapshots),
            Arc::clone(&probe),
            Arc::clone(&scanner) as Arc<dyn CodeScanner>,
        ));

        let authenticator =
            Arc::from(create_authenticator(&config.auth).expect("Failed to create authenticator"));

        let app_state = Arc::new(AppState::new(
            config,
            authenticator,
            audit_handle,
            audit_store,
            orchestrator,
            snapshots,
            sync,
            Arc::clone(&scanner),
        ));

        let router = create_router(app_state);

        Self {
            router,
            directory: directory_mock,
            probe: probe_mock,
            scanner,
            temp_dir,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, &[]).await
    }

    #[allow(dead_code)]
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.send(Method::GET, path, None, headers).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body), &[]).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.send(Method::POST, path, None, &[]).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(Method::DELETE, path, None, &[]).await
    }
}

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::sync::ConflictPolicy;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// The event this device admits guests for.
    pub event: EventConfig,
    /// Ticket directory service connection.
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

/// Active event configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventConfig {
    /// Event identifier in the ticket directory service.
    pub id: String,
}

/// Ticket directory service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// Directory service base URL (e.g., "http://tickets.example.com")
    pub url: String,
    /// API key sent with every directory request
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_directory_timeout")]
    pub timeout_secs: u32,
}

fn default_directory_timeout() -> u32 {
    10
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration for the device-local API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_method")]
    pub method: AuthMethod,
    /// API key (required when method = "api_key")
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            method: default_auth_method(),
            api_key: None,
        }
    }
}

fn default_auth_method() -> AuthMethod {
    AuthMethod::None
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("turnstile.db")
}

/// Sync engine configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SyncConfig {
    /// How rejected pending admissions are reconciled.
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

/// Connectivity probe configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectivityConfig {
    /// Probe timeout in seconds (default: 3). Kept short so a flaky link
    /// resolves to a strategy decision instead of hanging a scan.
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u32,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_probe_timeout() -> u32 {
    3
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub event: EventConfig,
    pub directory: SanitizedDirectoryConfig,
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub connectivity: ConnectivityConfig,
}

/// Sanitized directory config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDirectoryConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            event: config.event.clone(),
            directory: SanitizedDirectoryConfig {
                url: config.directory.url.clone(),
                api_key_configured: config
                    .directory
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                timeout_secs: config.directory.timeout_secs,
            },
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config.auth.api_key.as_ref().is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            sync: config.sync.clone(),
            connectivity: config.connectivity.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[event]
id = "summer-gala-2026"

[directory]
url = "http://tickets.example.com"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.event.id, "summer-gala-2026");
        assert_eq!(config.directory.url, "http://tickets.example.com");
        assert_eq!(config.directory.timeout_secs, 10);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path.to_str().unwrap(), "turnstile.db");
        assert!(matches!(config.auth.method, AuthMethod::None));
        assert_eq!(
            config.sync.conflict_policy,
            ConflictPolicy::FirstAdmissionWins
        );
        assert_eq!(config.connectivity.timeout_secs, 3);
    }

    #[test]
    fn test_deserialize_missing_event_fails() {
        let toml = r#"
[directory]
url = "http://tickets.example.com"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_missing_directory_fails() {
        let toml = r#"
[event]
id = "summer-gala-2026"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[event]
id = "summer-gala-2026"

[directory]
url = "http://tickets.example.com"
api_key = "directory-secret"
timeout_secs = 5

[auth]
method = "api_key"
api_key = "local-secret"

[server]
host = "127.0.0.1"
port = 9000

[database]
path = "/data/gate-3.db"

[sync]
conflict_policy = "first_admission_wins"

[connectivity]
timeout_secs = 2
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.directory.timeout_secs, 5);
        assert_eq!(config.directory.api_key.as_deref(), Some("directory-secret"));
        assert!(matches!(config.auth.method, AuthMethod::ApiKey));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path.to_str().unwrap(), "/data/gate-3.db");
        assert_eq!(config.connectivity.timeout_secs, 2);
    }

    #[test]
    fn test_sanitized_config_redacts_secrets() {
        let config = Config {
            event: EventConfig {
                id: "e-1".to_string(),
            },
            directory: DirectoryConfig {
                url: "http://tickets.example.com".to_string(),
                api_key: Some("directory-secret".to_string()),
                timeout_secs: 10,
            },
            auth: AuthConfig {
                method: AuthMethod::ApiKey,
                api_key: Some("local-secret".to_string()),
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            sync: SyncConfig::default(),
            connectivity: ConnectivityConfig::default(),
        };

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.directory.api_key_configured);
        assert!(sanitized.auth.api_key_configured);
        assert_eq!(sanitized.auth.method, "api_key");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("directory-secret"));
        assert!(!json.contains("local-secret"));
    }
}

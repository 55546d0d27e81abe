use super::{types::AuthMethod, types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Event id is nonempty
/// - Directory URL is present and http(s)
/// - Timeouts are nonzero
/// - API-key auth actually has a key
/// - Server port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.event.id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "event.id cannot be empty".to_string(),
        ));
    }

    if !config.directory.url.starts_with("http://") && !config.directory.url.starts_with("https://")
    {
        return Err(ConfigError::ValidationError(
            "directory.url must be an http(s) URL".to_string(),
        ));
    }

    if config.directory.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "directory.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.connectivity.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "connectivity.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is api_key".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, ConnectivityConfig, DatabaseConfig, DirectoryConfig, EventConfig, ServerConfig,
        SyncConfig,
    };

    fn valid_config() -> Config {
        Config {
            event: EventConfig {
                id: "summer-gala-2026".to_string(),
            },
            directory: DirectoryConfig {
                url: "http://tickets.example.com".to_string(),
                api_key: None,
                timeout_secs: 10,
            },
            auth: AuthConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            sync: SyncConfig::default(),
            connectivity: ConnectivityConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_event_id_fails() {
        let mut config = valid_config();
        config.event.id = "  ".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_non_http_directory_url_fails() {
        let mut config = valid_config();
        config.directory.url = "tickets.example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = valid_config();
        config.directory.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_api_key_method_requires_key() {
        let mut config = valid_config();
        config.auth.method = AuthMethod::ApiKey;
        config.auth.api_key = None;
        assert!(validate_config(&config).is_err());

        config.auth.api_key = Some("secret".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}

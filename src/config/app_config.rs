use serde::Deserialize;

use crate::domain::CredentialPolicy;

/// Application configuration
///
/// Loaded once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub accounts: CredentialPolicy,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `memory` or `postgres`
    pub backend: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Apply pending schema migrations when the service starts
    pub run_migrations: bool,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub algorithm: String,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the Prometheus text format
    pub path: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[hidden]"))
            .field("algorithm", &self.algorithm)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
            max_connections: 10,
            connect_timeout_secs: 30,
            run_migrations: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            algorithm: "HS256".to_string(),
            token_ttl_secs: 3600,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl StorageConfig {
    /// Explicit URL, then `DATABASE_URL`, then the discrete `PG_*` variables
    pub fn resolve_database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()))
            .or_else(|| database_url_from_parts(|key| std::env::var(key).ok()))
    }
}

impl AuthConfig {
    /// Configured secret, falling back to `JWT_SECRET`
    pub fn resolve_secret(&self) -> Option<String> {
        self.jwt_secret
            .clone()
            .or_else(|| std::env::var("JWT_SECRET").ok())
    }
}

/// Assemble a URL from `PG_USER`, `PG_PASSWORD`, `PG_HOST`, `PG_PORT`, `PG_DATABASE`
fn database_url_from_parts(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let host = lookup("PG_HOST")?;
    let database = lookup("PG_DATABASE")?;
    let port = lookup("PG_PORT").unwrap_or_else(|| "5432".to_string());

    let credentials = match (lookup("PG_USER"), lookup("PG_PASSWORD")) {
        (Some(user), Some(password)) => format!("{}:{}@", user, password),
        (Some(user), None) => format!("{}@", user),
        _ => String::new(),
    };

    Some(format!(
        "postgres://{}{}:{}/{}",
        credentials, host, port, database
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.auth.algorithm, "HS256");
        assert_eq!(config.accounts, CredentialPolicy::default());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"server": {"port": 9000}, "accounts": {"min_password_length": 8}}"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.accounts.min_password_length, 8);
        assert_eq!(config.accounts.max_username_length, 50);
    }

    #[test]
    fn test_metrics_section() {
        let config: AppConfig =
            serde_json::from_str(r#"{"metrics": {"enabled": false}}"#).unwrap();
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.path, "/metrics");
    }

    #[test]
    fn test_database_url_from_parts() {
        let url = database_url_from_parts(lookup_from(&[
            ("PG_USER", "blog"),
            ("PG_PASSWORD", "pw"),
            ("PG_HOST", "db"),
            ("PG_PORT", "6543"),
            ("PG_DATABASE", "posts"),
        ]));
        assert_eq!(url.as_deref(), Some("postgres://blog:pw@db:6543/posts"));
    }

    #[test]
    fn test_database_url_from_parts_requires_host_and_database() {
        assert!(database_url_from_parts(lookup_from(&[("PG_HOST", "db")])).is_none());

        let url = database_url_from_parts(lookup_from(&[("PG_HOST", "db"), ("PG_DATABASE", "x")]));
        assert_eq!(url.as_deref(), Some("postgres://db:5432/x"));
    }

    #[test]
    fn test_explicit_database_url_wins() {
        let storage = StorageConfig {
            database_url: Some("postgres://explicit/db".to_string()),
            ..Default::default()
        };
        assert_eq!(
            storage.resolve_database_url().as_deref(),
            Some("postgres://explicit/db")
        );
    }

    #[test]
    fn test_auth_debug_hides_secret() {
        let auth = AuthConfig {
            jwt_secret: Some("super-secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", auth).contains("super-secret"));
    }
}

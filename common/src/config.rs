//! Application configuration.
//!
//! Values come from environment variables with defaults suitable for local
//! development. `main` loads an optional `.env` file before calling
//! [`AppConfig::load_with_service`].

use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8880;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_MAX_LIFETIME_SECS: u64 = 300;

/// Origins allowed by the CORS layer when `CORS_ALLOWED_ORIGINS` is unset.
pub const DEFAULT_CORS_ORIGINS: [&str; 5] = [
    "http://localhost:1420",
    "http://localhost:5173",
    "http://localhost:5174",
    "http://127.0.0.1:1420",
    "https://app.opendbm.com",
];

/// Service-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name reported in the startup log.
    pub service_name: String,
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Origins accepted by the CORS layer.
    pub cors_origins: Vec<String>,
    /// Fixed bounds applied to every database handle.
    pub pool: PoolSettings,
}

/// Pool bounds applied to every opened database handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum open connections per handle.
    pub max_connections: u32,
    /// Maximum lifetime of a pooled connection.
    pub max_lifetime: Duration,
    /// Time allowed to open or acquire a connection.
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_lifetime: Duration::from_secs(DEFAULT_MAX_LIFETIME_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "connection-service".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            pool: PoolSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    pub fn load_with_service(service_name: &str) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `PORT` wins over `SERVER_PORT`; unparsable numbers fall back to the
    /// defaults.
    pub fn from_lookup<F>(service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse_u64 = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let port = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        let pool = PoolSettings {
            max_connections: lookup("DB_POOL_MAX_CONNECTIONS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            max_lifetime: Duration::from_secs(parse_u64(
                "DB_POOL_MAX_LIFETIME_SECS",
                DEFAULT_MAX_LIFETIME_SECS,
            )),
            connect_timeout: Duration::from_secs(parse_u64(
                "DB_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
        };

        Self {
            service_name: service_name.to_string(),
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port,
            cors_origins,
            pool,
        }
    }

    /// Returns the `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
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
    fn test_defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup("svc", lookup_from(&[]));
        assert_eq!(config.service_name, "svc");
        assert_eq!(config.port, 8880);
        assert_eq!(config.bind_address(), "0.0.0.0:8880");
        assert_eq!(config.cors_origins.len(), 5);
        assert_eq!(config.pool, PoolSettings::default());
        assert_eq!(config.pool.max_connections, 25);
        assert_eq!(config.pool.max_lifetime, Duration::from_secs(300));
    }

    #[test]
    fn test_port_prefers_port_over_server_port() {
        let config = AppConfig::from_lookup(
            "svc",
            lookup_from(&[("PORT", "9000"), ("SERVER_PORT", "9100")]),
        );
        assert_eq!(config.port, 9000);

        let config = AppConfig::from_lookup("svc", lookup_from(&[("SERVER_PORT", "9100")]));
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = AppConfig::from_lookup(
            "svc",
            lookup_from(&[("PORT", "abc"), ("DB_POOL_MAX_CONNECTIONS", "0")]),
        );
        assert_eq!(config.port, 8880);
        assert_eq!(config.pool.max_connections, 25);
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let config = AppConfig::from_lookup(
            "svc",
            lookup_from(&[("CORS_ALLOWED_ORIGINS", " http://a.test , ,http://b.test")]),
        );
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}

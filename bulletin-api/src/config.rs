//! Server Configuration
//!
//! Configuration is read once from environment variables at startup, with
//! defaults suitable for local development. There is no hot reload.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use bulletin_storage::{CacheConfig, RefreshMode};
use thiserror::Error;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Startup configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port value: {value}")]
    InvalidPort { value: String },

    #[error("Invalid bind address {addr}: {reason}")]
    InvalidBindAddress { addr: String, reason: String },
}

// ============================================================================
// SERVER CONFIGURATION
// ============================================================================

/// Process-wide server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory holding the dataset files.
    pub data_dir: PathBuf,

    /// TTL shared by every dataset.
    pub cache_ttl: Duration,

    /// How concurrent refreshes of one dataset are handled.
    pub refresh_mode: RefreshMode,

    /// Bind host.
    pub bind_host: String,

    /// Bind port.
    pub port: u16,

    /// Allowed CORS origins. Empty means allow any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            refresh_mode: RefreshMode::Permissive,
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create ServerConfig from environment variables.
    ///
    /// Environment variables:
    /// - `DATA_DIR`: data directory (default: `data`)
    /// - `CACHE_TTL`: TTL in seconds (default: 60)
    /// - `BULLETIN_REFRESH_MODE`: `permissive` or `single-flight` (default: permissive)
    /// - `BULLETIN_BIND`: bind host (default: 0.0.0.0)
    /// - `PORT` or `BULLETIN_PORT`: bind port (default: 5000)
    /// - `BULLETIN_CORS_ORIGINS`: comma-separated allowed origins (empty = allow all)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let cache_ttl = lookup("CACHE_TTL")
            .map(|raw| parse_ttl(&raw))
            .unwrap_or(defaults.cache_ttl);

        let refresh_mode = match lookup("BULLETIN_REFRESH_MODE") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid BULLETIN_REFRESH_MODE, using permissive");
                RefreshMode::Permissive
            }),
            None => defaults.refresh_mode,
        };

        let bind_host = lookup("BULLETIN_BIND").unwrap_or(defaults.bind_host);

        let port = match lookup("PORT").or_else(|| lookup("BULLETIN_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => defaults.port,
        };

        let cors_origins = lookup("BULLETIN_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            data_dir,
            cache_ttl,
            refresh_mode,
            bind_host,
            port,
            cors_origins,
        })
    }

    /// Cache settings derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_ttl(self.cache_ttl)
            .with_refresh_mode(self.refresh_mode)
    }

    /// Whether the data directory currently exists.
    pub fn data_dir_exists(&self) -> bool {
        self.data_dir.exists()
    }

    /// Resolve the socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddress {
                addr: addr.clone(),
                reason: e.to_string(),
            })
    }
}

/// Parse a TTL in whole seconds.
///
/// Negative values clamp to zero (every read refreshes). Unparsable values
/// fall back to the default.
fn parse_ttl(raw: &str) -> Duration {
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs >= 0 => Duration::from_secs(secs as u64),
        Ok(secs) => {
            tracing::warn!(value = secs, "Negative CACHE_TTL, caching disabled");
            Duration::ZERO
        }
        Err(_) => {
            tracing::warn!(
                value = raw,
                default = DEFAULT_CACHE_TTL_SECS,
                "Invalid CACHE_TTL, using default"
            );
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.port, 5000);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("DATA_DIR", "/srv/content"),
            ("CACHE_TTL", "5"),
            ("BULLETIN_REFRESH_MODE", "single-flight"),
            ("PORT", "8080"),
            ("BULLETIN_CORS_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/content"));
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.refresh_mode, RefreshMode::SingleFlight);
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_invalid_ttl_falls_back_to_default() {
        let config = config_from(&[("CACHE_TTL", "soon")]).unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_negative_ttl_disables_caching() {
        let config = config_from(&[("CACHE_TTL", "-3")]).unwrap();
        assert_eq!(config.cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_port_precedence_and_validation() {
        let config = config_from(&[("PORT", "9000"), ("BULLETIN_PORT", "9001")]).unwrap();
        assert_eq!(config.port, 9000);

        let config = config_from(&[("BULLETIN_PORT", "9001")]).unwrap();
        assert_eq!(config.port, 9001);

        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidPort {
                value: "http".to_string()
            }
        );
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:5000");

        let config = ServerConfig {
            bind_host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_cache_config_carries_ttl_and_mode() {
        let config = config_from(&[("CACHE_TTL", "12"), ("BULLETIN_REFRESH_MODE", "permissive")])
            .unwrap();
        let cache = config.cache_config();
        assert_eq!(cache.ttl, Duration::from_secs(12));
        assert_eq!(cache.refresh_mode, RefreshMode::Permissive);
    }

    #[test]
    fn test_empty_data_dir_uses_default() {
        let config = config_from(&[("DATA_DIR", "  ")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }
}

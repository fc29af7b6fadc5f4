//! Server configuration read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `3000` |
//! | `BIND_ADDR` | `127.0.0.1` |
//! | `TREE_DB_PATH` | `./tree.db` |
//! | `LOG_LEVEL` | `debug` (debug builds) / `info` |
//! | `LOG_DIR` | unset: log to stderr |
//! | `CORS_ALLOW_ORIGIN` | unset: any origin |
//!
//! Empty values count as unset.

use axum::http::HeaderValue;
use nodetree_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_PATH: &str = "./tree.db";

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key}=`{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Runtime configuration of the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub cors_allow_origin: Option<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            cors_allow_origin: None,
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = get("PORT") {
            config.port = parse_value("PORT", value)?;
        }
        if let Some(value) = get("BIND_ADDR") {
            config.bind_addr = parse_value("BIND_ADDR", value)?;
        }
        if let Some(value) = get("TREE_DB_PATH") {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = get("LOG_LEVEL") {
            config.log_level = value;
        }
        config.log_dir = get("LOG_DIR");
        if let Some(value) = get("CORS_ALLOW_ORIGIN") {
            let header = HeaderValue::from_str(&value).map_err(|err| ConfigError::InvalidValue {
                key: "CORS_ALLOW_ORIGIN",
                value: value.clone(),
                reason: err.to_string(),
            })?;
            config.cors_allow_origin = Some(header);
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_value<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    value.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
        key,
        reason: err.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, DEFAULT_DB_PATH, DEFAULT_PORT};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(config.log_dir.is_none());
        assert!(config.cors_allow_origin.is_none());
    }

    #[test]
    fn values_override_defaults_and_blank_counts_as_unset() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("BIND_ADDR", "0.0.0.0"),
            ("TREE_DB_PATH", "/tmp/nodes.db"),
            ("LOG_LEVEL", "warn"),
            ("LOG_DIR", "  "),
            ("CORS_ALLOW_ORIGIN", "http://localhost:5173"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.db_path, PathBuf::from("/tmp/nodes.db"));
        assert_eq!(config.log_level, "warn");
        assert!(config.log_dir.is_none());
        assert_eq!(
            config.cors_allow_origin.unwrap().to_str().unwrap(),
            "http://localhost:5173"
        );
    }

    #[test]
    fn invalid_port_is_reported_with_key() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "seventy")])).unwrap_err();
        let ConfigError::InvalidValue { key, value, .. } = &err;
        assert_eq!(*key, "PORT");
        assert_eq!(value, "seventy");
        assert!(err.to_string().contains("PORT"));
    }
}

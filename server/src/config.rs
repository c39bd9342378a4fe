use std::env;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::info;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Origin used when building absolute short links. Falls back to the
    /// request's Host header when unset.
    pub public_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = match lookup("BIND_ADDR") {
            Some(value) => value.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    key: "BIND_ADDR",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => {
                info!("BIND_ADDR not set, using default: {}", DEFAULT_BIND_ADDR);
                SocketAddr::from(([0, 0, 0, 0], 3000))
            }
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            bind_addr,
            public_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/foodgram")]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.public_base_url, None);
    }

    #[test]
    fn test_database_url_required() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_invalid_bind_addr() {
        let result = load(&[
            ("DATABASE_URL", "postgres://localhost/foodgram"),
            ("BIND_ADDR", "not-an-addr"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));
    }

    #[test]
    fn test_public_base_url_trailing_slash_trimmed() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/foodgram"),
            ("PUBLIC_BASE_URL", "https://foodgram.example/"),
        ])
        .unwrap();
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("https://foodgram.example")
        );
    }
}

//! Process configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::loader::{CatalogConfig, MAX_CATALOG_TTL, RetryPolicy};

/// Default directory holding `<network_id>.json` files.
const DEFAULT_DATA_DIR: &str = "data/networks";

/// Default cap on suggestions returned over HTTP.
const DEFAULT_SUGGEST_LIMIT: usize = 20;

/// Error for an environment variable that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Directory of network files.
    pub data_dir: PathBuf,

    /// Network cache settings.
    pub cache: CacheConfig,

    /// Catalog cache settings.
    pub catalog: CatalogConfig,

    /// Maximum suggestions per HTTP request.
    pub suggest_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache: CacheConfig::default(),
            catalog: CatalogConfig::default(),
            suggest_limit: DEFAULT_SUGGEST_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// | Variable                  | Default          |
    /// |---------------------------|------------------|
    /// | `METRO_BIND_ADDR`         | `127.0.0.1:3000` |
    /// | `METRO_DATA_DIR`          | `data/networks`  |
    /// | `METRO_CACHE_CAPACITY`    | `8`              |
    /// | `METRO_LOAD_TIMEOUT_SECS` | `5`              |
    /// | `METRO_LOAD_RETRIES`      | `3`              |
    /// | `METRO_CATALOG_TTL_SECS`  | `60`             |
    /// | `METRO_SUGGEST_LIMIT`     | `20`             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = parse_var(&lookup, "METRO_BIND_ADDR")?.unwrap_or(defaults.bind_addr);
        let data_dir = lookup("METRO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let capacity: usize =
            parse_var(&lookup, "METRO_CACHE_CAPACITY")?.unwrap_or(defaults.cache.capacity);
        if capacity == 0 {
            return Err(ConfigError {
                var: "METRO_CACHE_CAPACITY",
                value: capacity.to_string(),
                reason: "capacity must be at least 1".to_string(),
            });
        }

        let mut retry = RetryPolicy::default();
        if let Some(secs) = parse_var::<u64>(&lookup, "METRO_LOAD_TIMEOUT_SECS")? {
            retry = retry.with_timeout(Duration::from_secs(secs));
        }
        if let Some(attempts) = parse_var::<u32>(&lookup, "METRO_LOAD_RETRIES")? {
            retry = retry.with_max_attempts(attempts);
        }

        let catalog = match parse_var::<u64>(&lookup, "METRO_CATALOG_TTL_SECS")? {
            Some(secs) if secs > MAX_CATALOG_TTL.as_secs() => {
                return Err(ConfigError {
                    var: "METRO_CATALOG_TTL_SECS",
                    value: secs.to_string(),
                    reason: format!("ttl must be at most {} seconds", MAX_CATALOG_TTL.as_secs()),
                });
            }
            Some(secs) => CatalogConfig {
                ttl: Duration::from_secs(secs),
            },
            None => defaults.catalog,
        };

        let suggest_limit =
            parse_var(&lookup, "METRO_SUGGEST_LIMIT")?.unwrap_or(defaults.suggest_limit);

        Ok(Self {
            bind_addr,
            data_dir,
            cache: CacheConfig::new(capacity).with_retry(retry),
            catalog,
            suggest_limit,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(ConfigError {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

//! Environment-driven configuration. `.env` is loaded by `main` first.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Process-wide settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS (the admin UI).
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight manual scans.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub scan: ScanConfig,
}

impl ServerConfig {
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    ///
    /// See [`JwtConfig::from_env`] and [`ScanConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins: split_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            scan: ScanConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Scan executor, deletion and scheduler tuning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Catalog bridge base URL, used for both reads and deletions.
    pub catalog_base_url: String,
    pub catalog_timeout_secs: u64,
    pub deletion_timeout_secs: u64,
    /// Evaluation chunks in flight at once.
    pub workers: usize,
    /// Items per evaluation chunk.
    pub chunk_size: usize,
    pub scheduler_tick_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: "http://localhost:8090".to_string(),
            catalog_timeout_secs: 30,
            deletion_timeout_secs: 60,
            workers: 4,
            chunk_size: 64,
            scheduler_tick_secs: 60,
        }
    }
}

impl ScanConfig {
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `CATALOG_BASE_URL`      | `http://localhost:8090` |
    /// | `CATALOG_TIMEOUT_SECS`  | `30`                    |
    /// | `DELETION_TIMEOUT_SECS` | `60`                    |
    /// | `SCAN_WORKERS`          | `4`                     |
    /// | `SCAN_CHUNK_SIZE`       | `64`                    |
    /// | `SCHEDULER_TICK_SECS`   | `60`                    |
    ///
    /// Worker count, chunk size and tick are raised to at least 1.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            catalog_base_url: std::env::var("CATALOG_BASE_URL")
                .unwrap_or(defaults.catalog_base_url),
            catalog_timeout_secs: env_or("CATALOG_TIMEOUT_SECS", defaults.catalog_timeout_secs),
            deletion_timeout_secs: env_or("DELETION_TIMEOUT_SECS", defaults.deletion_timeout_secs),
            workers: env_or("SCAN_WORKERS", defaults.workers).max(1),
            chunk_size: env_or("SCAN_CHUNK_SIZE", defaults.chunk_size).max(1),
            scheduler_tick_secs: env_or("SCHEDULER_TICK_SECS", defaults.scheduler_tick_secs).max(1),
        }
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    pub fn deletion_timeout(&self) -> Duration {
        Duration::from_secs(self.deletion_timeout_secs)
    }

    pub fn scheduler_tick(&self) -> Duration {
        Duration::from_secs(self.scheduler_tick_secs)
    }
}

/// Read and parse `name`, or return `default` when it is unset.
///
/// Panics when the variable is set but does not parse.
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} has an invalid value '{raw}'")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_origins() {
        assert_eq!(
            split_origins(" http://a , ,http://b"),
            vec!["http://a".to_string(), "http://b".to_string()]
        );
        assert!(split_origins("").is_empty());
    }

    #[test]
    fn bind_addr_rejects_hostnames() {
        let mut config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            cors_origins: vec![],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            jwt: JwtConfig {
                secret: "s".into(),
                access_token_expiry_mins: 15,
                leeway_secs: 0,
            },
            scan: ScanConfig::default(),
        };
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");

        config.host = "localhost".into();
        assert!(config.bind_addr().is_err());
    }
}

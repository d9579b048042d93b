// src/config.rs
// =============================================================================
// Runtime settings for the prober.
//
// The values come from the command line (or environment variables, see
// cli.rs) and are checked here before the server starts, so a bad setting
// fails fast at startup instead of on the first request.
// =============================================================================

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

/// Upper bound on concurrent outbound GETs per request unless configured.
pub const DEFAULT_POOL_SIZE: usize = 250;

/// How many redirects a single probe follows before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Problems found while validating settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pool size must be at least 1")]
    ZeroPoolSize,
    #[error("invalid listen host '{0}'")]
    InvalidHost(String),
}

/// Settings for the worker pool and the HTTP client it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Maximum number of workers (and so in-flight GETs) per request
    pub pool_size: usize,
    /// Redirect limit handed to reqwest
    pub max_redirects: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        Ok(())
    }

    /// Number of workers to spawn for a batch of `batch_len` URLs.
    ///
    /// Never more than `pool_size`, and never more workers than there is
    /// work for: extra workers would only sit on an empty queue.
    pub fn workers_for(&self, batch_len: usize) -> usize {
        self.pool_size.min(batch_len)
    }
}

/// Everything main.rs needs to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub probe: ProbeConfig,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16, probe: ProbeConfig) -> Result<Self, ConfigError> {
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host.to_string()))?;
        probe.validate()?;

        Ok(Self {
            listen_addr: SocketAddr::new(ip, port),
            probe,
        })
    }
}

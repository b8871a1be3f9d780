//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `LABELCHECK_*` environment
//! variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `LABELCHECK_*` overrides on top of
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory the intake collaborator stores uploaded images in.
    /// Default: `./tmp/uploads`.
    pub upload_dir: PathBuf,

    /// Vision model used by the extraction provider. Default: `gpt-4.1-mini`.
    pub provider_model: String,

    /// Per-call provider timeout in seconds. Default: `60`.
    pub provider_timeout_secs: u64,

    /// Maximum label groups per batch submission. Default: `100`.
    pub max_batch_size: usize,

    /// Concurrency ceiling for in-flight label groups. Default: `10`.
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            upload_dir: PathBuf::from("./tmp/uploads"),
            provider_model: "gpt-4.1-mini".to_string(),
            provider_timeout_secs: 60,
            max_batch_size: crate::pipeline::DEFAULT_MAX_BATCH_SIZE,
            concurrency: crate::pipeline::DEFAULT_CONCURRENCY,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "LABELCHECK_PORT";
    const ENV_BIND_ADDR: &'static str = "LABELCHECK_BIND_ADDR";
    const ENV_UPLOAD_DIR: &'static str = "LABELCHECK_UPLOAD_DIR";
    const ENV_PROVIDER_MODEL: &'static str = "LABELCHECK_PROVIDER_MODEL";
    const ENV_PROVIDER_TIMEOUT_SECS: &'static str = "LABELCHECK_PROVIDER_TIMEOUT_SECS";
    const ENV_MAX_BATCH_SIZE: &'static str = "LABELCHECK_MAX_BATCH_SIZE";
    const ENV_CONCURRENCY: &'static str = "LABELCHECK_CONCURRENCY";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let upload_dir = Self::parse_path_from_env(Self::ENV_UPLOAD_DIR, defaults.upload_dir);
        let provider_model =
            Self::parse_string_from_env(Self::ENV_PROVIDER_MODEL, defaults.provider_model);
        let provider_timeout_secs = Self::parse_u64_from_env(
            Self::ENV_PROVIDER_TIMEOUT_SECS,
            defaults.provider_timeout_secs,
        );
        let max_batch_size =
            Self::parse_usize_from_env(Self::ENV_MAX_BATCH_SIZE, defaults.max_batch_size);
        let concurrency = Self::parse_usize_from_env(Self::ENV_CONCURRENCY, defaults.concurrency);

        Ok(Self {
            port,
            bind_addr,
            upload_dir,
            provider_model,
            provider_timeout_secs,
            max_batch_size,
            concurrency,
        })
    }

    /// Validates basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.exists() && !self.upload_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.upload_dir.clone(),
            });
        }

        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                value: self.concurrency,
            });
        }

        if self.max_batch_size == 0 || self.max_batch_size > 100 {
            return Err(ConfigError::InvalidBatchLimit {
                value: self.max_batch_size,
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

//! Server configuration from environment variables.

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "5001";
const DEFAULT_DATA_FILE: &str = "data/routes.json";
const DEFAULT_STATIC_DIR: &str = "static";

/// An environment variable held a value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on (`HOST` and `PORT`)
    pub bind_addr: SocketAddr,

    /// Route snapshot file (`FARE_DATA_FILE`); `None` keeps routes in memory
    pub data_file: Option<PathBuf>,

    /// Directory served under `/static` (`STATIC_DIR`)
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5001)),
            data_file: Some(PathBuf::from(DEFAULT_DATA_FILE)),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read each variable.
    ///
    /// Unset variables fall back to their defaults. An empty
    /// `FARE_DATA_FILE` disables the snapshot file.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host: IpAddr = try_load(&lookup, "HOST", DEFAULT_HOST)?;
        let port: u16 = try_load(&lookup, "PORT", DEFAULT_PORT)?;

        let data_file = match lookup("FARE_DATA_FILE") {
            Some(path) if path.trim().is_empty() => {
                info!("FARE_DATA_FILE is empty, routes will not be saved");
                None
            }
            Some(path) => Some(PathBuf::from(path)),
            None => {
                info!("FARE_DATA_FILE not set, using default: {DEFAULT_DATA_FILE}");
                Some(PathBuf::from(DEFAULT_DATA_FILE))
            }
        };

        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            data_file,
            static_dir: PathBuf::from(static_dir),
        })
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

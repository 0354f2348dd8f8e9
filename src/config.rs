//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::db::paths;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the document and proofs
    pub data_dir: PathBuf,
    /// The competition document
    pub data_file: PathBuf,
    /// Managed folder for uploaded proof files
    pub proofs_dir: PathBuf,
    /// Interface to bind (loopback unless overridden)
    pub host: IpAddr,
    /// Server port
    pub port: u16,
    /// UI origin allowed by CORS
    pub frontend_url: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self::for_data_dir(PathBuf::from("data"))
    }
}

impl Config {
    /// Config with every path derived from `data_dir`.
    pub fn for_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_file: data_dir.join(paths::DATA_FILE),
            proofs_dir: data_dir.join(paths::PROOFS_DIR),
            data_dir,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let data_dir = env::var("FITNESS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        let defaults = Self::for_data_dir(data_dir);

        let host = match env::var("HOST") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("HOST", raw))?,
            Err(_) => defaults.host,
        };

        Ok(Self {
            data_file: env::var("FITNESS_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            proofs_dir: env::var("FITNESS_PROOFS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.proofs_dir),
            data_dir: defaults.data_dir,
            host,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

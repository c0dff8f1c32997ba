//! Server configuration.
//!
//! Bind address, storage location, CORS origin, request timeout and logging
//! settings. Loaded from an optional JSON file, then overridden from the
//! command line (see [`crate::cli`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid CORS origin `{0}`; expected a single origin such as http://localhost:5173")]
    InvalidOrigin(String),

    #[error("request timeout must be at least one second")]
    InvalidTimeout,

    #[error("invalid bind address `{0}`")]
    InvalidAddress(String),
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file (default: "petstore.sqlite3")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// The one front-end origin allowed to make cross-origin requests
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Upper bound for handling one request (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// trace|debug|info|warn|error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Absolute directory for rolling log files; stderr when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_path() -> PathBuf {
    PathBuf::from("petstore.sqlite3")
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string() // Vite dev server
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    petstore_core::default_log_level().to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            cors_origin: default_cors_origin(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parses the configured origin into a header value.
    ///
    /// Wildcards and lists are rejected: exactly one origin is allowed.
    pub fn cors_origin_header(&self) -> Result<HeaderValue, ConfigError> {
        let origin = self.cors_origin.trim();
        if origin.is_empty() || origin == "*" || origin.contains(',') {
            return Err(ConfigError::InvalidOrigin(self.cors_origin.clone()));
        }
        HeaderValue::from_str(origin)
            .map_err(|_| ConfigError::InvalidOrigin(self.cors_origin.clone()))
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        self.cors_origin_header()?;
        Ok(())
    }
}

//! Command line arguments for the `petstore` binary.
//!
//! Every flag can also come from a `PETSTORE_*` environment variable and
//! overrides the matching field of the JSON config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ServerConfig};

/// Pet catalog HTTP service
#[derive(Debug, Parser)]
#[command(name = "petstore", version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, env = "PETSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "PETSTORE_HOST")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(long, env = "PETSTORE_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "PETSTORE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Front-end origin allowed to make cross-origin requests
    #[arg(long, env = "PETSTORE_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "PETSTORE_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "PETSTORE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files (stderr when omitted)
    #[arg(long, env = "PETSTORE_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Cli {
    /// Builds the effective configuration: file (or defaults), then flags.
    pub fn resolve_config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        if let Some(origin) = &self.cors_origin {
            config.cors_origin = origin.clone();
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

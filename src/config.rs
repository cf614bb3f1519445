//! Configuration handling for the railway-bootstrap binary.
//!
//! This module provides configuration via CLI arguments and environment variables.
//! The library itself only reads the database and secret variables through
//! [`crate::env::Environment`]; everything here drives the diagnostic command.

use crate::db::ConnectionOverrides;
use crate::secrets::{Deployment, SecretCatalog, SecretId};
use clap::Parser;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration for the railway-bootstrap binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "railway-bootstrap",
    about = "Check database and secret configuration for a Railway deployment",
    version,
    author
)]
pub struct Config {
    /// Deployment tag used to pick the service account key (prod or dev)
    #[arg(
        long,
        value_enum,
        ignore_case = true,
        default_value = "dev",
        env = "DEPLOYMENT_ENV"
    )]
    pub deployment: Deployment,

    /// Additional secrets to enable beyond the default catalog.
    /// Can be specified multiple times or as comma-separated values.
    #[arg(
        long = "enable-secret",
        value_name = "NAME",
        env = "ENABLED_SECRETS",
        value_delimiter = ','
    )]
    pub enable_secrets: Vec<SecretId>,

    /// Open one database connection to verify reachability
    #[arg(long, env = "BOOTSTRAP_PING")]
    pub ping: bool,

    /// Full connection string, overrides DATABASE_URL
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// Database host, overrides DATABASE_HOST
    #[arg(long)]
    pub database_host: Option<String>,

    /// Database port, overrides DATABASE_PORT
    #[arg(long)]
    pub database_port: Option<u16>,

    /// Database user, overrides DATABASE_USER
    #[arg(long)]
    pub database_user: Option<String>,

    /// Database name, overrides DATABASE_NAME
    #[arg(long)]
    pub database_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "BOOTSTRAP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "BOOTSTRAP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            deployment: Deployment::Dev,
            enable_secrets: Vec::new(),
            ping: false,
            database_url: None,
            database_host: None,
            database_port: None,
            database_user: None,
            database_name: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }

    /// Connection overrides from the command line, if any were given.
    ///
    /// Passwords are never accepted on the command line.
    pub fn connection_overrides(&self) -> Option<ConnectionOverrides> {
        let overrides = ConnectionOverrides {
            connection_string: self.database_url.clone(),
            host: self.database_host.clone(),
            port: self.database_port,
            user: self.database_user.clone(),
            password: None,
            database: self.database_name.clone(),
        };
        (overrides != ConnectionOverrides::default()).then_some(overrides)
    }

    /// The secret catalog with any extra secrets enabled.
    pub fn secret_catalog(&self) -> SecretCatalog {
        SecretCatalog::with_enabled(self.enable_secrets.iter().copied())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

//! Railway Bootstrap Library
//!
//! Startup glue for a backend service hosted on a platform that injects its
//! configuration through environment variables: a PostgreSQL connection
//! factory and an environment-backed secrets provider.

pub mod config;
pub mod db;
pub mod env;
pub mod error;
pub mod secrets;

pub use config::Config;
pub use db::{ConnectionFactory, ConnectionOverrides, SERIAL_MODE, TransactionMode};
pub use env::{Environment, ProcessEnvironment};
pub use error::{BootstrapError, BootstrapResult};
pub use secrets::{
    Deployment, EnvSecretsProvider, SecretBundle, SecretId, SecretString, SecretsProvider,
};

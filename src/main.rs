//! railway-bootstrap - configuration check entry point.
//!
//! Resolves the database connection, loads secrets and the service account
//! credential the same way the service does at startup, and reports what is
//! missing. Secret values are never printed.

use clap::Parser;
use railway_bootstrap::BootstrapError;
use railway_bootstrap::config::Config;
use railway_bootstrap::db::ConnectionFactory;
use railway_bootstrap::secrets::{EnvSecretsProvider, SecretsProvider};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    info!(
        deployment = %config.deployment,
        "Starting railway-bootstrap v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut healthy = true;

    // Database
    let factory = ConnectionFactory::new();
    let overrides = config.connection_overrides();
    match factory.get_or_create_client(overrides.as_ref()).await {
        Ok(pool) => {
            if let Some((host, port)) = factory.parameters().and_then(|p| p.target()) {
                info!(host = %host, port, "Database configuration resolved");
            }
            if config.ping {
                match pool.acquire().await {
                    Ok(_conn) => info!("Database connection established"),
                    Err(e) => {
                        let e = BootstrapError::from(e);
                        error!(
                            error = %e,
                            suggestion = e.suggestion().unwrap_or_default(),
                            "Database ping failed"
                        );
                        healthy = false;
                    }
                }
            }
        }
        Err(e) => {
            error!(
                error = %e,
                suggestion = e.suggestion().unwrap_or_default(),
                "Database configuration invalid"
            );
            healthy = false;
        }
    }

    // Secrets
    let provider = EnvSecretsProvider::new().with_catalog(config.secret_catalog());
    provider.load_secrets_into_environment(None);

    let catalog = provider.catalog();
    let bundle = provider.get_secrets(None, &[]);
    info!(count = bundle.len(), "Secrets available");
    for id in bundle.ids() {
        let group = catalog.group_of(id).map(|g| g.as_str()).unwrap_or_default();
        info!(secret = %id, group, "Secret loaded");
    }

    for id in provider.missing_required() {
        let group = catalog.group_of(id).map(|g| g.as_str()).unwrap_or_default();
        error!(secret = %id, group, "Required secret not set");
        healthy = false;
    }

    // Service account
    match provider.get_service_account_credential(config.deployment) {
        Ok(Some(cred)) => info!(
            project_id = cred.project_id().unwrap_or("<unknown>"),
            "Service account credential loaded"
        ),
        Ok(None) => warn!("Continuing without a service account credential"),
        Err(e) => {
            error!(error = %e, "Service account credential invalid");
            healthy = false;
        }
    }

    factory.close().await;

    if healthy {
        info!("Configuration check passed");
        ExitCode::SUCCESS
    } else {
        error!("Configuration check failed");
        ExitCode::FAILURE
    }
}

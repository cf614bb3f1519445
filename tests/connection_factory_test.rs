//! Integration tests for the connection factory.

use railway_bootstrap::db::params::{
    APPLICATION_NAME, CONNECT_TIMEOUT, ENV_DATABASE_HOST, ENV_DATABASE_NAME,
    ENV_DATABASE_PASSWORD, ENV_DATABASE_PORT, ENV_DATABASE_URL, ENV_DATABASE_USER,
    MAX_CONNECTIONS,
};
use railway_bootstrap::db::{ConnectionFactory, ConnectionOverrides, ConnectionParameters};
use railway_bootstrap::env::map_env;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_url_wins_over_discrete_variables() {
    let factory = ConnectionFactory::with_env(map_env([
        (ENV_DATABASE_URL, "postgres://app:pw@url-host:6543/appdb"),
        (ENV_DATABASE_HOST, "discrete-host"),
        (ENV_DATABASE_PORT, "7000"),
        (ENV_DATABASE_USER, "discrete-user"),
        (ENV_DATABASE_PASSWORD, "discrete-pw"),
        (ENV_DATABASE_NAME, "discrete-db"),
    ]));

    let pool = assert_ok!(factory.get_or_create_client(None).await);
    let connect = pool.connect_options();
    assert_eq!(connect.get_host(), "url-host");
    assert_eq!(connect.get_port(), 6543);
    assert_eq!(connect.get_username(), "app");
    assert_eq!(connect.get_database(), Some("appdb"));

    assert!(matches!(
        factory.parameters(),
        Some(ConnectionParameters::Url { .. })
    ));
}

#[tokio::test]
async fn test_missing_url_and_host() {
    let factory = ConnectionFactory::with_env(map_env([
        (ENV_DATABASE_PASSWORD, "pw"),
        (ENV_DATABASE_USER, "someone"),
    ]));

    let err = assert_err!(factory.get_or_create_client(None).await);
    assert!(err.is_configuration());
    assert!(
        err.to_string()
            .contains("No DATABASE_URL or DATABASE_HOST configured")
    );
}

#[tokio::test]
async fn test_missing_password_is_a_distinct_error() {
    let no_host = ConnectionFactory::with_env(map_env([(ENV_DATABASE_PASSWORD, "pw")]));
    let no_password = ConnectionFactory::with_env(map_env([(ENV_DATABASE_HOST, "pg")]));

    let host_err = assert_err!(no_host.get_or_create_client(None).await);
    let password_err = assert_err!(no_password.get_or_create_client(None).await);

    assert!(password_err.is_configuration());
    assert!(password_err.to_string().contains("No DATABASE_PASSWORD configured"));
    assert!(!password_err.to_string().contains("DATABASE_HOST"));
    assert_ne!(host_err.to_string(), password_err.to_string());
}

#[tokio::test]
async fn test_second_call_returns_cached_pool() {
    let factory = ConnectionFactory::with_env(map_env([
        (ENV_DATABASE_HOST, "first-host"),
        (ENV_DATABASE_PASSWORD, "pw"),
    ]));

    let first = assert_ok!(factory.get_or_create_client(None).await);

    let different = ConnectionOverrides::default()
        .with_host("second-host")
        .with_port(9999)
        .with_password("other");
    let second = assert_ok!(factory.get_or_create_client(Some(&different)).await);

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.connect_options().get_host(), "first-host");
}

#[tokio::test]
async fn test_cached_pool_survives_invalid_later_overrides() {
    let factory = ConnectionFactory::with_env(map_env([(ENV_DATABASE_URL, "postgres://h/db")]));
    let first = assert_ok!(factory.get_or_create_client(None).await);

    // Would fail validation on a fresh factory; ignored once the pool exists
    let broken = ConnectionOverrides::default().with_connection_string("not a url");
    let second = assert_ok!(factory.get_or_create_client(Some(&broken)).await);
    assert!(std::ptr::eq(first, second));
}

#[tokio::test]
async fn test_discrete_path_applies_fixed_settings() {
    let factory = ConnectionFactory::with_env(map_env([
        (ENV_DATABASE_HOST, "pg.railway.internal"),
        (ENV_DATABASE_PORT, "5433"),
        (ENV_DATABASE_PASSWORD, "pw"),
    ]));

    let pool = assert_ok!(factory.get_or_create_client(None).await);
    assert_eq!(pool.options().get_max_connections(), MAX_CONNECTIONS);
    assert_eq!(pool.options().get_acquire_timeout(), CONNECT_TIMEOUT);
    assert_eq!(pool.connect_options().get_port(), 5433);
    assert_eq!(pool.connect_options().get_database(), Some("railway"));
    assert_eq!(
        pool.connect_options().get_application_name(),
        Some(APPLICATION_NAME)
    );
}

#[tokio::test]
async fn test_concurrent_first_calls_create_one_pool() {
    let factory = Arc::new(ConnectionFactory::with_env(map_env([
        (ENV_DATABASE_HOST, "pg"),
        (ENV_DATABASE_PASSWORD, "pw"),
    ])));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let factory = Arc::clone(&factory);
        handles.push(tokio::spawn(async move {
            let pool = factory.get_or_create_client(None).await.unwrap();
            pool as *const sqlx::PgPool as usize
        }));
    }

    let mut addresses = Vec::new();
    for handle in handles {
        addresses.push(handle.await.unwrap());
    }
    addresses.dedup();
    assert_eq!(addresses.len(), 1);
}

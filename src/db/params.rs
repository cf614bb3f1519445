//! Connection parameter resolution.
//!
//! Parameters come from caller overrides first, then environment variables,
//! then fixed defaults (port, user and database only).

use crate::env::Environment;
use crate::error::{BootstrapError, BootstrapResult};
use crate::secrets::SecretString;
use std::time::Duration;
use url::Url;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DATABASE_HOST: &str = "DATABASE_HOST";
pub const ENV_DATABASE_PORT: &str = "DATABASE_PORT";
pub const ENV_DATABASE_USER: &str = "DATABASE_USER";
pub const ENV_DATABASE_PASSWORD: &str = "DATABASE_PASSWORD";
pub const ENV_DATABASE_NAME: &str = "DATABASE_NAME";

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_DATABASE: &str = "railway";

// Fixed pool settings for the discrete-parameter path
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const IDLE_IN_TRANSACTION_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const MAX_CONNECTIONS: u32 = 20;

/// Reported to the server as `application_name` on the discrete path.
pub const APPLICATION_NAME: &str = env!("CARGO_PKG_NAME");

/// Caller-supplied values that take precedence over the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionOverrides {
    pub connection_string: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub database: Option<String>,
}

impl ConnectionOverrides {
    pub fn with_connection_string(mut self, url: impl Into<String>) -> Self {
        self.connection_string = Some(url.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password));
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

impl std::fmt::Debug for ConnectionOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionOverrides")
            .field(
                "connection_string",
                &self.connection_string.as_deref().map(masked_url),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("database", &self.database)
            .finish()
    }
}

/// Resolved connection target.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionParameters {
    /// Full connection string. Discrete parameters are ignored entirely.
    Url { url: String },
    Discrete {
        host: String,
        port: u16,
        user: String,
        password: SecretString,
        database: String,
    },
}

impl ConnectionParameters {
    /// Resolve parameters from overrides and the environment.
    ///
    /// Empty strings count as unset, in overrides and environment alike.
    pub fn resolve(
        overrides: Option<&ConnectionOverrides>,
        env: &impl Environment,
    ) -> BootstrapResult<Self> {
        let defaults = ConnectionOverrides::default();
        let o = overrides.unwrap_or(&defaults);

        if let Some(url) = pick(&o.connection_string, env, ENV_DATABASE_URL) {
            return Ok(Self::Url { url });
        }

        let host = pick(&o.host, env, ENV_DATABASE_HOST)
            .ok_or_else(BootstrapError::missing_connection_target)?;
        let password = pick_secret(&o.password, env, ENV_DATABASE_PASSWORD)
            .ok_or_else(BootstrapError::missing_password)?;

        let port = match o.port.filter(|p| *p != 0) {
            Some(port) => port,
            None => parse_port(env)?,
        };
        let user = pick(&o.user, env, ENV_DATABASE_USER).unwrap_or_else(|| DEFAULT_USER.into());
        let database =
            pick(&o.database, env, ENV_DATABASE_NAME).unwrap_or_else(|| DEFAULT_DATABASE.into());

        Ok(Self::Discrete {
            host,
            port,
            user,
            password,
            database,
        })
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url { .. })
    }

    /// Host and port for log lines. `None` when a URL has no parsable host.
    pub fn target(&self) -> Option<(String, u16)> {
        match self {
            Self::Url { url } => {
                let parsed = Url::parse(url).ok()?;
                let host = parsed.host_str()?.to_string();
                Some((host, parsed.port().unwrap_or(DEFAULT_PORT)))
            }
            Self::Discrete { host, port, .. } => Some((host.clone(), *port)),
        }
    }
}

impl std::fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url { url } => f.debug_struct("Url").field("url", &masked_url(url)).finish(),
            Self::Discrete {
                host,
                port,
                user,
                database,
                ..
            } => f
                .debug_struct("Discrete")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("password", &"****")
                .field("database", database)
                .finish(),
        }
    }
}

fn pick(value: &Option<String>, env: &impl Environment, key: &str) -> Option<String> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .or_else(|| env.non_empty(key))
}

fn pick_secret(
    value: &Option<SecretString>,
    env: &impl Environment,
    key: &str,
) -> Option<SecretString> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .or_else(|| env.non_empty(key).map(SecretString::new))
}

fn parse_port(env: &impl Environment) -> BootstrapResult<u16> {
    match env.non_empty(ENV_DATABASE_PORT) {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw.trim().parse().map_err(|_| {
            BootstrapError::configuration(
                format!("DATABASE_PORT is not a valid port: '{}'", raw),
                "Set DATABASE_PORT to a number between 1 and 65535",
            )
        }),
    }
}

/// Mask the password component of a connection URL.
pub fn masked_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("****"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparsable connection string>".to_string(),
    }
}

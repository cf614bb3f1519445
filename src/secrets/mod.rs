//! Secrets loading.
//!
//! Secrets are read from environment variables populated by the hosting
//! platform. The [`SecretsProvider`] trait is the seam for other backends.
//!
//! # Example
//!
//! ```rust,ignore
//! use railway_bootstrap::secrets::{Deployment, EnvSecretsProvider, SecretId, SecretsProvider};
//!
//! let provider = EnvSecretsProvider::new();
//! let secrets = provider.get_secrets(None, &[]);
//! let api_secret = secrets.require(SecretId::ApiSecret)?.expose_secret();
//!
//! let firebase = provider.get_service_account_credential(Deployment::Prod)?;
//! ```

pub mod bundle;
pub mod catalog;
pub mod credential;
pub mod provider;
pub mod secret_string;

pub use bundle::SecretBundle;
pub use catalog::{DEFAULT_SECRETS, SecretCatalog, SecretDescriptor, SecretGroup, SecretId};
pub use credential::{Deployment, ServiceAccountCredential};
pub use provider::{EnvSecretsProvider, SecretsProvider};
pub use secret_string::SecretString;

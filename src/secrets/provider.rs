//! Secrets provider trait and the environment-variable backend.

use crate::env::{Environment, ProcessEnvironment};
use crate::error::BootstrapResult;
use crate::secrets::bundle::SecretBundle;
use crate::secrets::catalog::{SecretCatalog, SecretId};
use crate::secrets::credential::{Deployment, ENV_SERVICE_ACCOUNT_KEY, ServiceAccountCredential};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Source of application secrets.
///
/// `credentials` authenticate against a remote secret manager. Backends that
/// read from the local environment ignore them.
pub trait SecretsProvider: Send + Sync {
    /// Fetch the requested secrets. An empty `ids` slice means every enabled
    /// secret. Secrets that are not set are left out of the bundle; callers
    /// decide which ones they cannot run without.
    fn get_secrets(
        &self,
        credentials: Option<&ServiceAccountCredential>,
        ids: &[SecretId],
    ) -> SecretBundle;

    /// Make every enabled secret visible in the process environment.
    fn load_secrets_into_environment(&self, credentials: Option<&ServiceAccountCredential>);

    /// The service-account credential for `deployment`, if one is configured.
    fn get_service_account_credential(
        &self,
        deployment: Deployment,
    ) -> BootstrapResult<Option<ServiceAccountCredential>>;
}

/// Reads secrets straight from environment variables.
///
/// Meant for platforms that inject secrets into the environment at deploy
/// time, so there is nothing to fetch or cache.
#[derive(Debug, Clone)]
pub struct EnvSecretsProvider<E: Environment = ProcessEnvironment> {
    env: E,
    catalog: SecretCatalog,
}

impl EnvSecretsProvider<ProcessEnvironment> {
    /// Provider over the process environment and the default catalog.
    pub fn new() -> Self {
        Self::with_env(ProcessEnvironment)
    }
}

impl Default for EnvSecretsProvider<ProcessEnvironment> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Environment> EnvSecretsProvider<E> {
    pub fn with_env(env: E) -> Self {
        Self {
            env,
            catalog: SecretCatalog::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: SecretCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &SecretCatalog {
        &self.catalog
    }

    /// Required secrets whose variables are unset or empty.
    pub fn missing_required(&self) -> Vec<SecretId> {
        self.catalog
            .required_ids()
            .into_iter()
            .filter(|id| self.env.non_empty(id.as_str()).is_none())
            .collect()
    }

    /// Unset, empty and JSON `null` all mean "no credential here".
    fn parse_credential(
        &self,
        variable: &str,
    ) -> BootstrapResult<Option<ServiceAccountCredential>> {
        let Some(raw) = self.env.non_empty(variable).map(Zeroizing::new) else {
            return Ok(None);
        };
        let credential = ServiceAccountCredential::parse(variable, &raw)?;
        if credential.is_none() {
            debug!(variable, "Service account key is null; treating it as unset");
        }
        Ok(credential)
    }
}

impl<E: Environment> SecretsProvider for EnvSecretsProvider<E> {
    fn get_secrets(
        &self,
        _credentials: Option<&ServiceAccountCredential>,
        ids: &[SecretId],
    ) -> SecretBundle {
        let requested = if ids.is_empty() {
            self.catalog.enabled_ids()
        } else {
            ids.to_vec()
        };

        let mut bundle = SecretBundle::new();
        for id in requested {
            if !self.catalog.is_enabled(id) {
                warn!(secret = %id, "Requested secret is disabled in the catalog; skipping");
                continue;
            }
            match self.env.non_empty(id.as_str()) {
                Some(value) => bundle.insert(id, value),
                None => debug!(secret = %id, "Secret not set"),
            }
        }
        bundle
    }

    fn load_secrets_into_environment(&self, _credentials: Option<&ServiceAccountCredential>) {
        // The platform already populated the environment.
        info!("Secrets loaded from environment variables");
    }

    fn get_service_account_credential(
        &self,
        deployment: Deployment,
    ) -> BootstrapResult<Option<ServiceAccountCredential>> {
        // A malformed tag-specific key aborts; it does not fall through.
        let scoped = deployment.service_account_variable();
        if let Some(cred) = self.parse_credential(scoped)? {
            debug!(variable = scoped, "Using deployment-specific service account key");
            return Ok(Some(cred));
        }

        if let Some(cred) = self.parse_credential(ENV_SERVICE_ACCOUNT_KEY)? {
            debug!(
                variable = ENV_SERVICE_ACCOUNT_KEY,
                "Using generic service account key"
            );
            return Ok(Some(cred));
        }

        warn!(
            deployment = %deployment,
            "No Firebase service account key found. Firebase auth will be disabled."
        );
        Ok(None)
    }
}

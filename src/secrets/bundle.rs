//! Loaded secret values.

use crate::error::{BootstrapError, BootstrapResult};
use crate::secrets::catalog::SecretId;
use crate::secrets::secret_string::SecretString;
use std::collections::BTreeMap;

/// Secret values keyed by id, in catalog order.
///
/// Only secrets that were actually set appear; a missing secret is never
/// present with an empty value. Values are zeroized when the bundle is dropped.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretBundle {
    values: BTreeMap<SecretId, SecretString>,
}

impl SecretBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: SecretId, value: impl Into<SecretString>) {
        self.values.insert(id, value.into());
    }

    pub fn get(&self, id: SecretId) -> Option<&SecretString> {
        self.values.get(&id)
    }

    pub fn contains(&self, id: SecretId) -> bool {
        self.values.contains_key(&id)
    }

    /// Get a secret the caller cannot run without.
    pub fn require(&self, id: SecretId) -> BootstrapResult<&SecretString> {
        self.get(id)
            .ok_or_else(|| BootstrapError::missing_secret(id.as_str()))
    }

    /// Ids present in the bundle.
    pub fn ids(&self) -> impl Iterator<Item = SecretId> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SecretId, &SecretString)> {
        self.values.iter().map(|(id, v)| (*id, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// Values never appear in Debug output.
impl std::fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.values.keys().map(|id| (id.as_str(), "****")))
            .finish()
    }
}

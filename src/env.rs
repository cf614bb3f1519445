//! Environment variable sources.
//!
//! Both the connection factory and the secrets provider read configuration
//! through the [`Environment`] trait. Production code uses [`ProcessEnvironment`];
//! tests and embedding applications can hand in a fixed map instead of
//! touching the process environment.

use std::collections::{BTreeMap, HashMap};

/// A read-only source of environment variables.
pub trait Environment: Send + Sync {
    /// Raw lookup. `None` when the variable is not set.
    fn var(&self, key: &str) -> Option<String>;

    /// Lookup that treats an empty value the same as an unset variable.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// Reads from the environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        // Non-UTF-8 values are treated as unset.
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

impl<E: Environment + ?Sized> Environment for std::sync::Arc<E> {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// Build a map environment from string pairs.
pub fn map_env<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

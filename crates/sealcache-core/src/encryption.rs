//! Encryption context bound to every decrypt call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute under which the looked-up key is bound into the context.
pub const KEY_ID_ATTRIBUTE: &str = "keyId";

/// Authenticated, non-secret context passed to the key service.
///
/// The base context comes from configuration and is never mutated; each
/// decrypt call gets its own copy with the key bound under
/// [`KEY_ID_ATTRIBUTE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptionContext(BTreeMap<String, String>);

impl EncryptionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Copy of this context with `key` bound under [`KEY_ID_ATTRIBUTE`].
    pub fn bind_key(&self, key: &str) -> Self {
        let mut bound = self.clone();
        bound.0.insert(KEY_ID_ATTRIBUTE.to_string(), key.to_string());
        bound
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EncryptionContext
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<EncryptionContext> for std::collections::HashMap<String, String> {
    fn from(context: EncryptionContext) -> Self {
        context.0.into_iter().collect()
    }
}

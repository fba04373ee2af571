//! In-process table of resolved lookup outcomes.

use sealcache_core::CacheValue;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Key to [`CacheValue`] table with no expiry and no eviction.
///
/// Entries are only ever inserted or overwritten. Locks are held for the
/// duration of a single map operation and never across an `.await`.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheValue>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn seeded(entries: HashMap<String, CacheValue>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// The cached outcome for `key`, if one has been resolved.
    pub fn lookup(&self, key: &str) -> Option<CacheValue> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Insert or overwrite the outcome for `key`.
    pub fn record(&self, key: &str, value: CacheValue) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_record() {
        let store = CacheStore::new();
        assert!(store.lookup("k1").is_none());

        store.record("k1", CacheValue::hit("v1"));
        store.record("k2", CacheValue::Absent);

        assert_eq!(store.lookup("k1"), Some(CacheValue::hit("v1")));
        assert_eq!(store.lookup("k2"), Some(CacheValue::Absent));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_record_is_idempotent() {
        let store = CacheStore::new();
        store.record("k1", CacheValue::Absent);
        store.record("k1", CacheValue::Absent);
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("k1"), Some(CacheValue::Absent));
    }

    #[test]
    fn test_seeded() {
        let store = CacheStore::seeded(HashMap::from([
            ("k1".to_string(), CacheValue::hit("v1")),
            ("gone".to_string(), CacheValue::Absent),
        ]));
        assert_eq!(store.lookup("k1"), Some(CacheValue::hit("v1")));
        assert_eq!(store.lookup("gone"), Some(CacheValue::Absent));
        assert!(store.lookup("k2").is_none());
        assert_eq!(store.len(), 2);
    }
}

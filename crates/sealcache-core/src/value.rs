//! Cached lookup outcomes.

/// A resolved lookup outcome held by the cache store.
///
/// Only resolved outcomes are ever cached: a key with no entry has simply
/// not been looked up yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    /// Decrypted plaintext.
    Hit(Vec<u8>),
    /// Confirmed that no usable value exists for the key.
    Absent,
}

impl CacheValue {
    pub fn hit(plaintext: impl Into<Vec<u8>>) -> Self {
        CacheValue::Hit(plaintext.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CacheValue::Absent)
    }

    /// The value a caller sees: plaintext on a hit, nothing when absent.
    pub fn into_plaintext(self) -> Option<Vec<u8>> {
        match self {
            CacheValue::Hit(plaintext) => Some(plaintext),
            CacheValue::Absent => None,
        }
    }
}

impl From<Option<Vec<u8>>> for CacheValue {
    fn from(value: Option<Vec<u8>>) -> Self {
        value.map_or(CacheValue::Absent, CacheValue::Hit)
    }
}

//! Classification of blob source failures.

use sealcache_core::RemoteError;

/// Blob source error codes that resolve a lookup as absent.
///
/// `AccessDenied` is included alongside `NoSuchKey`: a bucket policy that
/// hides an object reads the same as a missing object, and such keys are
/// negative-cached like missing ones.
pub const NOT_FOUND_CODES: [&str; 2] = ["AccessDenied", "NoSuchKey"];

/// How a failed blob fetch resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    /// The object is absent. The lookup succeeds with no value.
    NotFound,
    /// A real error, surfaced to the caller and never cached.
    Other,
}

pub fn classify(err: &RemoteError) -> FetchFailure {
    match err.code.as_deref() {
        Some(code) if NOT_FOUND_CODES.contains(&code) => FetchFailure::NotFound,
        _ => FetchFailure::Other,
    }
}

//! Span creation for lookups and the remote calls they make.

use tracing::{Level, Span, field, span};

/// Create a span for a whole lookup.
pub fn lookup_span(key: &str) -> Span {
    span!(Level::INFO, "cache.lookup", cache.key = key)
}

/// Child span around fetching the encrypted object.
pub fn blob_fetch_span(parent: &Span, bucket: &str, key: &str) -> Span {
    span!(
        parent: parent,
        Level::INFO,
        "AWS.S3.getObject",
        blob.bucket = bucket,
        blob.key = key,
        error = field::Empty
    )
}

/// Child span around decrypting the ciphertext.
pub fn decrypt_span(parent: &Span, key: &str) -> Span {
    span!(
        parent: parent,
        Level::INFO,
        "AWS.KMS.decrypt",
        cache.key = key,
        error = field::Empty
    )
}

/// Tag a remote-call span as failed.
pub fn mark_error(span: &Span) {
    span.record("error", true);
}

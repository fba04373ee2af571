//! Lazy, memoizing access to encrypted values held in a blob store.
//!
//! [`SealedCache`] resolves a key by checking its in-memory table, then
//! fetching the encrypted object from a [`BlobSource`] and decrypting it
//! through a [`KeyService`]. Hits and confirmed absences are cached for the
//! life of the cache; errors are returned to the caller and never cached.
//!
//! The AWS implementations of the two ports live in `sealcache-aws`.

pub mod classify;
pub mod hooks;
pub mod pipeline;
pub mod store;

pub use classify::{FetchFailure, NOT_FOUND_CODES, classify};
pub use hooks::{FanoutHooks, JsonLinesHooks, NoopHooks, ObservabilityHooks, StderrHooks, TracingHooks};
pub use pipeline::{LookupContext, RemoteClients, SealedCache};
pub use store::CacheStore;

pub use sealcache_core::{
    BlobSource, CacheConfig, CacheSettings, CacheValue, ConfigError, EncryptionContext, Error,
    EventLevel, KeyService, LatencyMeasurement, RemoteCall, RemoteError, Result, ServiceTarget,
    StaticCredentials, TelemetryEvent,
};

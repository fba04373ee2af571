//! The retrieval pipeline: cache check, blob fetch, decrypt, cache update.

use crate::classify::{FetchFailure, classify};
use crate::hooks::{FanoutHooks, NoopHooks, ObservabilityHooks, StderrHooks};
use crate::store::CacheStore;
use sealcache_core::telemetry::redact_ciphertext;
use sealcache_core::{
    BlobSource, CacheConfig, CacheSettings, CacheValue, EncryptionContext, Error, KeyService,
    LatencyMeasurement, Result, TargetMetadata, TelemetryEvent,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span, debug};

/// Public operation name reported in telemetry target metadata.
const METHOD: &str = "lookup";

/// Per-call options for [`SealedCache::lookup`].
#[derive(Debug, Clone, Default)]
pub struct LookupContext {
    /// Remote calls run in child spans of this span when set.
    pub parent_span: Option<Span>,
}

impl LookupContext {
    pub fn with_parent(parent_span: Span) -> Self {
        Self {
            parent_span: Some(parent_span),
        }
    }

    fn child_span(&self, make: impl FnOnce(&Span) -> Span) -> Span {
        match &self.parent_span {
            Some(parent) => make(parent),
            None => Span::none(),
        }
    }
}

/// Remote clients handed back by a connector passed to [`SealedCache::from_config`].
pub struct RemoteClients {
    pub blobs: Arc<dyn BlobSource>,
    pub keys: Arc<dyn KeyService>,
}

/// One step of a lookup.
enum Stage {
    CheckCache,
    FetchBlob,
    Decrypt(Vec<u8>),
    Resolve(CacheValue),
    Fail(Error),
}

/// Lazy, memoizing accessor for encrypted values held in a blob store.
///
/// A lookup is served from memory when the key has been resolved before;
/// otherwise the encrypted object is fetched, decrypted under the
/// configured encryption context, and the outcome cached. Confirmed
/// absence is cached too. Errors are returned and never cached, so the
/// next lookup of the same key retries.
///
/// Concurrent lookups of the same uncached key each run the full
/// fetch-and-decrypt sequence and record the same outcome.
pub struct SealedCache {
    bucket: String,
    encryption_context: EncryptionContext,
    store: CacheStore,
    blobs: Arc<dyn BlobSource>,
    keys: Arc<dyn KeyService>,
    hooks: Arc<dyn ObservabilityHooks>,
    primary_hooks: Arc<dyn ObservabilityHooks>,
    debug_sink: Arc<dyn ObservabilityHooks>,
    debug_telemetry: bool,
}

impl SealedCache {
    /// Create a cache over already-constructed remote clients.
    ///
    /// Telemetry goes nowhere unless `debug_telemetry_to_stderr` is set or
    /// a sink is installed with [`SealedCache::with_hooks`].
    pub fn new(settings: CacheSettings, blobs: Arc<dyn BlobSource>, keys: Arc<dyn KeyService>) -> Self {
        let primary_hooks: Arc<dyn ObservabilityHooks> = Arc::new(NoopHooks);
        let mut cache = Self {
            bucket: settings.bucket,
            encryption_context: settings.encryption_context,
            store: CacheStore::seeded(settings.initial_cache),
            blobs,
            keys,
            hooks: primary_hooks.clone(),
            primary_hooks,
            debug_sink: Arc::new(StderrHooks::stderr()),
            debug_telemetry: settings.debug_telemetry_to_stderr,
        };
        cache.compose_hooks();
        cache
    }

    /// Validate `config`, then build the remote clients with `connect`.
    ///
    /// `connect` is never invoked when validation fails.
    pub async fn from_config<F, Fut>(config: CacheConfig, connect: F) -> Result<Self>
    where
        F: FnOnce(&CacheSettings) -> Fut,
        Fut: Future<Output = Result<RemoteClients>>,
    {
        let settings = config.validate()?;
        let clients = connect(&settings).await?;
        debug!(bucket = %settings.bucket, seeded = settings.initial_cache.len(), "Sealed cache ready");
        Ok(Self::new(settings, clients.blobs, clients.keys))
    }

    /// Replace the telemetry sink. The debug mirror stays in place when
    /// it was configured.
    pub fn with_hooks(mut self, hooks: Arc<dyn ObservabilityHooks>) -> Self {
        self.primary_hooks = hooks;
        self.compose_hooks();
        self
    }

    /// Redirect the debug mirror enabled by `debug_telemetry_to_stderr`.
    /// Has no effect when the mirror is off.
    pub fn with_debug_sink(mut self, sink: Arc<dyn ObservabilityHooks>) -> Self {
        self.debug_sink = sink;
        self.compose_hooks();
        self
    }

    fn compose_hooks(&mut self) {
        self.hooks = if self.debug_telemetry {
            Arc::new(
                FanoutHooks::new()
                    .with(self.primary_hooks.clone())
                    .with(self.debug_sink.clone()),
            )
        } else {
            self.primary_hooks.clone()
        };
    }

    pub fn name(&self) -> &'static str {
        env!("CARGO_PKG_NAME")
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The cached outcome for `key`, without contacting any remote service.
    pub fn cached(&self, key: &str) -> Option<CacheValue> {
        self.store.lookup(key)
    }

    /// Number of resolved keys held in memory.
    pub fn cached_len(&self) -> usize {
        self.store.len()
    }

    /// [`SealedCache::lookup`] with no parent span.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.lookup(key, &LookupContext::default()).await
    }

    /// Resolve `key` to its plaintext.
    ///
    /// Returns `Ok(Some(plaintext))` on a hit, `Ok(None)` when the value is
    /// confirmed absent, and `Err` when a remote call failed.
    pub async fn lookup(&self, key: &str, context: &LookupContext) -> Result<Option<Vec<u8>>> {
        let mut stage = Stage::CheckCache;
        loop {
            stage = match stage {
                Stage::CheckCache => match self.store.lookup(key) {
                    Some(value) => {
                        debug!(key, absent = value.is_absent(), "Cache hit");
                        return Ok(value.into_plaintext());
                    }
                    None => Stage::FetchBlob,
                },
                Stage::FetchBlob => self.fetch_blob(key, context).await,
                Stage::Decrypt(ciphertext) => self.decrypt(key, ciphertext, context).await,
                Stage::Resolve(value) => {
                    debug!(key, absent = value.is_absent(), "Resolved");
                    self.store.record(key, value.clone());
                    return Ok(value.into_plaintext());
                }
                Stage::Fail(err) => return Err(err),
            };
        }
    }

    async fn fetch_blob(&self, key: &str, context: &LookupContext) -> Stage {
        let target = self.blobs.target();
        let metadata = TargetMetadata::new(METHOD, &target, "GetObject");
        let args = vec![json!({ "Bucket": self.bucket, "Key": key })];

        self.hooks.event(&TelemetryEvent::info(
            format!("getting object from {}", target.export),
            metadata.clone(),
            args.clone(),
        ));

        let span = context.child_span(|parent| sealcache_trace::blob_fetch_span(parent, &self.bucket, key));
        let started = Instant::now();
        let result = self
            .blobs
            .fetch_object(&self.bucket, key)
            .instrument(span.clone())
            .await;
        self.hooks
            .latency(&LatencyMeasurement::millis(started.elapsed(), metadata.clone()));

        let err = match result {
            Ok(ciphertext) => return Stage::Decrypt(ciphertext),
            Err(err) => err,
        };

        match classify(&err) {
            FetchFailure::NotFound => {
                self.hooks.event(
                    &TelemetryEvent::info("not found", metadata, args)
                        .with_error(&err, err.code.as_deref()),
                );
                Stage::Resolve(CacheValue::Absent)
            }
            FetchFailure::Other => {
                self.hooks.event(
                    &TelemetryEvent::error(
                        format!("getting object from {} failed", target.export),
                        metadata,
                        args,
                    )
                    .with_error(&err, err.code.as_deref()),
                );
                sealcache_trace::mark_error(&span);
                Stage::Fail(Error::BlobFetch(err))
            }
        }
    }

    async fn decrypt(&self, key: &str, ciphertext: Vec<u8>, context: &LookupContext) -> Stage {
        let target = self.keys.target();
        let metadata = TargetMetadata::new(METHOD, &target, "Decrypt");
        let encryption_context = self.encryption_context.bind_key(key);
        let args = vec![json!({
            "CiphertextBlob": redact_ciphertext(&ciphertext),
            "EncryptionContext": encryption_context,
        })];

        self.hooks.event(&TelemetryEvent::info(
            format!("decrypting ciphertext via {}", target.export),
            metadata.clone(),
            args.clone(),
        ));

        let span = context.child_span(|parent| sealcache_trace::decrypt_span(parent, key));
        let started = Instant::now();
        let result = self
            .keys
            .decrypt(&ciphertext, &encryption_context)
            .instrument(span.clone())
            .await;
        self.hooks
            .latency(&LatencyMeasurement::millis(started.elapsed(), metadata.clone()));

        match result {
            Ok(plaintext) => Stage::Resolve(CacheValue::from(plaintext)),
            Err(err) => {
                self.hooks.event(
                    &TelemetryEvent::error(
                        format!("decrypting ciphertext via {} failed", target.export),
                        metadata,
                        args,
                    )
                    .with_error(&err, err.code.as_deref()),
                );
                sealcache_trace::mark_error(&span);
                Stage::Fail(Error::Decrypt(err))
            }
        }
    }
}

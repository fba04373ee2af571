//! In-process fakes for the remote ports.

#![allow(dead_code)]

use async_trait::async_trait;
use sealcache::{
    BlobSource, CacheConfig, CacheValue, EncryptionContext, KeyService, LatencyMeasurement,
    ObservabilityHooks, RemoteCall, RemoteError, SealedCache, ServiceTarget, TelemetryEvent,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

pub type FetchResponse = Result<Vec<u8>, RemoteError>;
pub type DecryptResponse = Result<Option<Vec<u8>>, RemoteError>;

/// Blob source answering from a fixed table and recording every call.
#[derive(Default)]
pub struct FakeBlobSource {
    responses: HashMap<String, FetchResponse>,
    calls: Mutex<Vec<(String, String)>>,
    gate: Option<Arc<Barrier>>,
}

impl FakeBlobSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(mut self, key: &str, ciphertext: &[u8]) -> Self {
        self.responses.insert(key.to_string(), Ok(ciphertext.to_vec()));
        self
    }

    pub fn failing(mut self, key: &str, code: Option<&str>) -> Self {
        let mut err = RemoteError::new(RemoteCall::GetObject, "request failed");
        if let Some(code) = code {
            err = err.with_code(code);
        }
        self.responses.insert(key.to_string(), Err(err));
        self
    }

    /// Hold each fetch at `gate` until every party has arrived.
    pub fn gated(mut self, gate: Arc<Barrier>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobSource for FakeBlobSource {
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.responses.get(key).cloned().unwrap_or_else(|| {
            Err(RemoteError::new(RemoteCall::GetObject, "no such key").with_code("NoSuchKey"))
        })
    }

    fn target(&self) -> ServiceTarget {
        ServiceTarget::new("fake-s3", "S3")
    }
}

/// Key service answering by ciphertext and recording every call.
#[derive(Default)]
pub struct FakeKeyService {
    responses: HashMap<Vec<u8>, DecryptResponse>,
    calls: Mutex<Vec<(Vec<u8>, EncryptionContext)>>,
}

impl FakeKeyService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plaintext(mut self, ciphertext: &[u8], plaintext: &[u8]) -> Self {
        self.responses
            .insert(ciphertext.to_vec(), Ok(Some(plaintext.to_vec())));
        self
    }

    pub fn empty(mut self, ciphertext: &[u8]) -> Self {
        self.responses.insert(ciphertext.to_vec(), Ok(None));
        self
    }

    pub fn failing(mut self, ciphertext: &[u8], code: &str) -> Self {
        self.responses.insert(
            ciphertext.to_vec(),
            Err(RemoteError::new(RemoteCall::Decrypt, "decrypt failed").with_code(code)),
        );
        self
    }

    pub fn calls(&self) -> Vec<(Vec<u8>, EncryptionContext)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyService for FakeKeyService {
    async fn decrypt(
        &self,
        ciphertext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Option<Vec<u8>>, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((ciphertext.to_vec(), context.clone()));
        self.responses.get(ciphertext).cloned().unwrap_or_else(|| {
            Err(RemoteError::new(RemoteCall::Decrypt, "unknown ciphertext")
                .with_code("InvalidCiphertextException"))
        })
    }

    fn target(&self) -> ServiceTarget {
        ServiceTarget::new("fake-kms", "KMS")
    }
}

/// Hooks sink keeping everything it receives.
#[derive(Default)]
pub struct RecordingHooks {
    pub events: Mutex<Vec<TelemetryEvent>>,
    pub latencies: Mutex<Vec<LatencyMeasurement>>,
}

impl RecordingHooks {
    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn latency_calls(&self) -> Vec<String> {
        self.latencies
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.target_metadata.call_name())
            .collect()
    }
}

impl ObservabilityHooks for RecordingHooks {
    fn event(&self, event: &TelemetryEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn latency(&self, measurement: &LatencyMeasurement) {
        self.latencies.lock().unwrap().push(measurement.clone());
    }
}

/// `bucket = "b"`, `encryption_context = {"app": "x"}`.
pub fn base_config() -> CacheConfig {
    CacheConfig::builder()
        .bucket("b")
        .region("us-east-1")
        .context_attribute("app", "x")
        .build()
}

pub struct Harness {
    pub cache: SealedCache,
    pub blobs: Arc<FakeBlobSource>,
    pub keys: Arc<FakeKeyService>,
    pub hooks: Arc<RecordingHooks>,
}

impl Harness {
    pub fn new(blobs: FakeBlobSource, keys: FakeKeyService) -> Self {
        Self::with_seeds(blobs, keys, HashMap::new())
    }

    pub fn with_seeds(
        blobs: FakeBlobSource,
        keys: FakeKeyService,
        seeds: HashMap<String, CacheValue>,
    ) -> Self {
        let mut config = base_config();
        config.initial_cache = seeds;
        let settings = config.validate().expect("valid config");

        let blobs = Arc::new(blobs);
        let keys = Arc::new(keys);
        let hooks = Arc::new(RecordingHooks::default());
        let cache = SealedCache::new(settings, blobs.clone(), keys.clone()).with_hooks(hooks.clone());

        Self {
            cache,
            blobs,
            keys,
            hooks,
        }
    }

    pub fn remote_calls(&self) -> usize {
        self.blobs.calls().len() + self.keys.calls().len()
    }
}

/// Cloneable in-memory writer for JSON-lines sinks.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

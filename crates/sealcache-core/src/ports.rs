//! Port traits for the two remote collaborators.
//!
//! The retrieval pipeline only talks to these traits; the AWS adapters in
//! `sealcache-aws` and the in-process fakes used by tests implement them.

use crate::encryption::EncryptionContext;
use crate::error::RemoteError;
use async_trait::async_trait;

/// Remote object storage holding encrypted payloads.
#[async_trait]
pub trait BlobSource: Send + Sync {
    /// Fetch the raw encrypted bytes stored under `key` in `bucket`.
    ///
    /// Not-found conditions are reported as a [`RemoteError`] carrying the
    /// service's error code; the caller decides what counts as absent.
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError>;

    /// Module, export and version names used in telemetry target metadata.
    fn target(&self) -> ServiceTarget {
        ServiceTarget::new("blob-source", "BlobSource")
    }
}

/// Remote service performing authenticated decryption.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Decrypt `ciphertext` under `context`.
    ///
    /// `Ok(None)` means the call succeeded but produced no plaintext.
    async fn decrypt(
        &self,
        ciphertext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Option<Vec<u8>>, RemoteError>;

    fn target(&self) -> ServiceTarget {
        ServiceTarget::new("key-service", "KeyService")
    }
}

/// Identifies the client library behind a port for telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    pub module: String,
    pub export: String,
    pub version: Option<String>,
}

impl ServiceTarget {
    pub fn new(module: impl Into<String>, export: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            export: export.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

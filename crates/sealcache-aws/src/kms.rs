//! KMS key service.

use crate::error::remote_error;
use async_trait::async_trait;
use aws_sdk_kms::Client;
use aws_sdk_kms::primitives::Blob;
use sealcache_core::{EncryptionContext, KeyService, RemoteCall, RemoteError, ServiceTarget};

/// Decrypts ciphertext with KMS `Decrypt`.
///
/// No key id is sent: symmetric ciphertext names its own key.
#[derive(Clone)]
pub struct KmsKeyService {
    client: Client,
}

impl KmsKeyService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyService for KmsKeyService {
    async fn decrypt(
        &self,
        ciphertext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Option<Vec<u8>>, RemoteError> {
        let output = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext.to_vec()))
            .set_encryption_context(Some(context.clone().into()))
            .send()
            .await
            .map_err(|err| remote_error(RemoteCall::Decrypt, &err))?;

        Ok(output.plaintext().map(|blob| blob.as_ref().to_vec()))
    }

    fn target(&self) -> ServiceTarget {
        ServiceTarget::new("aws-sdk-kms", "KMS")
    }
}

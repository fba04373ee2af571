//! Shared AWS configuration and client construction.

use crate::{KmsKeyService, S3BlobSource};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::Credentials;
use aws_types::region::Region;
use sealcache::{CacheConfig, RemoteClients, Result, SealedCache, TracingHooks};
use sealcache_core::{CacheSettings, StaticCredentials};
use std::sync::Arc;
use tracing::{debug, info};

const CREDENTIALS_PROVIDER: &str = "sealcache";

/// The subset of [`CacheSettings`] that shapes the AWS clients.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub region: String,
    pub credentials: Option<StaticCredentials>,
    pub s3_endpoint: Option<String>,
    pub kms_endpoint: Option<String>,
    pub force_path_style: bool,
}

impl ClientOptions {
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            region: settings.region.clone(),
            credentials: settings.credentials.clone(),
            s3_endpoint: settings.s3_endpoint.clone(),
            kms_endpoint: settings.kms_endpoint.clone(),
            force_path_style: settings.force_path_style,
        }
    }
}

/// Load the configuration shared by the S3 and KMS clients.
///
/// Static credentials win over the default provider chain.
pub async fn load_sdk_config(options: &ClientOptions) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(options.region.clone()));

    if let Some(credentials) = &options.credentials {
        loader = loader.credentials_provider(Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER,
        ));
    }

    loader.load().await
}

/// Build both remote clients from one shared configuration.
pub async fn build_clients(options: ClientOptions) -> RemoteClients {
    let shared = load_sdk_config(&options).await;

    let mut s3_config = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint) = &options.s3_endpoint {
        s3_config = s3_config.endpoint_url(endpoint);
    }
    s3_config = s3_config.force_path_style(options.force_path_style);
    let s3 = aws_sdk_s3::Client::from_conf(s3_config.build());

    let mut kms_config = aws_sdk_kms::config::Builder::from(&shared);
    if let Some(endpoint) = &options.kms_endpoint {
        kms_config = kms_config.endpoint_url(endpoint);
    }
    let kms = aws_sdk_kms::Client::from_conf(kms_config.build());

    debug!(
        region = %options.region,
        s3_endpoint = ?options.s3_endpoint,
        kms_endpoint = ?options.kms_endpoint,
        "AWS clients built"
    );

    RemoteClients {
        blobs: Arc::new(S3BlobSource::new(s3)),
        keys: Arc::new(KmsKeyService::new(kms)),
    }
}

/// Validate `config` and build a cache backed by S3 and KMS.
///
/// Telemetry is routed to `tracing`, plus stderr when
/// `debug_telemetry_to_stderr` is set. No client is built for an invalid
/// configuration.
pub async fn connect(config: CacheConfig) -> Result<SealedCache> {
    let cache = SealedCache::from_config(config, |settings| {
        let options = ClientOptions::from_settings(settings);
        async move { Ok(build_clients(options).await) }
    })
    .await?;
    info!(bucket = cache.bucket(), "Connected sealed cache");
    Ok(cache.with_hooks(Arc::new(TracingHooks)))
}

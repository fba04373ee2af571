//! Layered CLI configuration: file, then environment, then flags.

use crate::commands::GlobalArgs;
use sealcache::{CacheConfig, ConfigError, EncryptionContext, StaticCredentials};
use sealcache_trace::{OtlpConfig, TracingConfig};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const ENV_PREFIX: &str = "SEALCACHE";

/// Scalar overrides read from `SEALCACHE_*` variables.
#[derive(Debug, Default, Deserialize)]
pub struct EnvOverrides {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub stderr_telemetry: Option<bool>,
    pub s3_endpoint: Option<String>,
    pub kms_endpoint: Option<String>,
    pub force_path_style: Option<bool>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(None)
    }

    fn from_source(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    fn apply(self, mut config: CacheConfig) -> Result<CacheConfig, ConfigError> {
        if self.bucket.is_some() {
            config.bucket = self.bucket;
        }
        if self.region.is_some() {
            config.region = self.region;
        }
        if let Some(enabled) = self.stderr_telemetry {
            config.debug_telemetry_to_stderr = enabled;
        }
        if self.s3_endpoint.is_some() {
            config.s3_endpoint = self.s3_endpoint;
        }
        if self.kms_endpoint.is_some() {
            config.kms_endpoint = self.kms_endpoint;
        }
        if let Some(enabled) = self.force_path_style {
            config.force_path_style = enabled;
        }

        match (self.access_key_id, self.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let mut credentials = StaticCredentials::new(access_key_id, secret_access_key);
                if let Some(token) = self.session_token {
                    credentials = credentials.with_session_token(token);
                }
                config.credentials = Some(credentials);
            }
            (None, None) => {}
            _ => {
                return Err(ConfigError::invalid(
                    "credentials",
                    "SEALCACHE_ACCESS_KEY_ID and SEALCACHE_SECRET_ACCESS_KEY must be set together",
                ));
            }
        }

        Ok(config)
    }
}

/// Read `.env` into the process environment. A missing file is fine; an
/// unreadable one is handed back so it can be reported once logging is up.
pub fn load_dotenv() -> Option<dotenvy::Error> {
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => Some(err),
        _ => None,
    }
}

/// Subscriber settings. `--otlp-endpoint` wins over `SEALCACHE_OTLP_ENDPOINT`.
pub fn tracing_config(args: &GlobalArgs, env: &EnvOverrides) -> TracingConfig {
    let endpoint = args
        .otlp_endpoint
        .clone()
        .or_else(|| env.otlp_endpoint.clone());
    TracingConfig {
        otlp: endpoint.map(|endpoint| OtlpConfig {
            endpoint,
            ..OtlpConfig::default()
        }),
        ..TracingConfig::default()
    }
}

/// Layer the config file, environment overrides, and flags.
pub fn load(args: &GlobalArgs, env: EnvOverrides) -> Result<CacheConfig, ConfigError> {
    let file = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading config file");
            CacheConfig::from_file(path)?
        }
        None => CacheConfig::default(),
    };

    Ok(apply_flags(env.apply(file)?, args))
}

fn apply_flags(mut config: CacheConfig, args: &GlobalArgs) -> CacheConfig {
    if let Some(bucket) = &args.bucket {
        config.bucket = Some(bucket.clone());
    }
    if let Some(region) = &args.region {
        config.region = Some(region.clone());
    }
    if args.stderr_telemetry {
        config.debug_telemetry_to_stderr = true;
    }
    if !args.context.is_empty() {
        let base = config
            .encryption_context
            .take()
            .unwrap_or_else(EncryptionContext::new);
        let merged = args
            .context
            .iter()
            .fold(base, |context, (name, value)| context.with(name, value));
        config.encryption_context = Some(merged);
    }
    config
}

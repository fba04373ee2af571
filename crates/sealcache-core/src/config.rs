//! Cache configuration and construction-time validation.
//!
//! [`CacheConfig`] is what callers fill in, programmatically or from a
//! YAML file. Required options are `Option`s so that a missing one is
//! reported as [`ConfigError::Missing`] instead of a parse failure.
//! [`CacheConfig::validate`] turns it into [`CacheSettings`], the only form
//! the cache and the remote clients accept.

use crate::encryption::{EncryptionContext, KEY_ID_ATTRIBUTE};
use crate::error::ConfigError;
use crate::value::CacheValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

const MASK: &str = "***";

/// Unvalidated cache configuration. Unknown options are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Bucket holding the encrypted objects.
    pub bucket: Option<String>,
    /// Region selecting the remote service endpoints.
    pub region: Option<String>,
    /// Base context merged with the key on every decrypt call.
    pub encryption_context: Option<EncryptionContext>,
    /// Pre-seeded cache entries. In files, `null` marks a key as absent.
    #[serde(default, with = "seed_map")]
    pub initial_cache: HashMap<String, CacheValue>,
    /// Static credentials shared by both remote clients.
    pub credentials: Option<StaticCredentials>,
    /// Mirror telemetry events to standard error.
    #[serde(default, alias = "stderr_telemetry")]
    pub debug_telemetry_to_stderr: bool,
    /// Override the S3 endpoint (S3-compatible stores, local testing).
    pub s3_endpoint: Option<String>,
    /// Override the KMS endpoint.
    pub kms_endpoint: Option<String>,
    /// Address buckets by path instead of virtual host.
    #[serde(default)]
    pub force_path_style: bool,
}

/// Static access credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl StaticCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    fn masked(&self) -> Self {
        Self {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: MASK.to_string(),
            session_token: self.session_token.as_ref().map(|_| MASK.to_string()),
        }
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub bucket: String,
    pub region: String,
    pub encryption_context: EncryptionContext,
    pub initial_cache: HashMap<String, CacheValue>,
    pub credentials: Option<StaticCredentials>,
    pub debug_telemetry_to_stderr: bool,
    pub s3_endpoint: Option<String>,
    pub kms_endpoint: Option<String>,
    pub force_path_style: bool,
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Parse configuration from YAML (JSON is accepted too).
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&contents)
    }

    /// Copy suitable for display: secrets and seeded plaintext are masked.
    pub fn masked(&self) -> Self {
        let initial_cache = self
            .initial_cache
            .iter()
            .map(|(key, value)| {
                let shown = match value {
                    CacheValue::Hit(_) => CacheValue::hit(MASK),
                    CacheValue::Absent => CacheValue::Absent,
                };
                (key.clone(), shown)
            })
            .collect();
        Self {
            credentials: self.credentials.as_ref().map(StaticCredentials::masked),
            initial_cache,
            ..self.clone()
        }
    }

    /// Check every option and produce the settings the cache runs on.
    pub fn validate(self) -> Result<CacheSettings, ConfigError> {
        let bucket = required("bucket", self.bucket)?;
        let region = required("region", self.region)?;
        let encryption_context = self
            .encryption_context
            .ok_or(ConfigError::Missing {
                field: "encryption_context",
            })?;
        if encryption_context.contains(KEY_ID_ATTRIBUTE) {
            return Err(ConfigError::invalid(
                "encryption_context",
                format!("attribute `{KEY_ID_ATTRIBUTE}` is reserved for the looked-up key"),
            ));
        }

        if let Some(credentials) = &self.credentials {
            if credentials.access_key_id.trim().is_empty() {
                return Err(ConfigError::invalid("credentials", "access_key_id is blank"));
            }
            if credentials.secret_access_key.trim().is_empty() {
                return Err(ConfigError::invalid("credentials", "secret_access_key is blank"));
            }
        }

        Ok(CacheSettings {
            bucket,
            region,
            encryption_context,
            initial_cache: self.initial_cache,
            credentials: self.credentials,
            debug_telemetry_to_stderr: self.debug_telemetry_to_stderr,
            s3_endpoint: endpoint("s3_endpoint", self.s3_endpoint)?,
            kms_endpoint: endpoint("kms_endpoint", self.kms_endpoint)?,
            force_path_style: self.force_path_style,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        None => Err(ConfigError::Missing { field }),
        Some(v) if v.trim().is_empty() => Err(ConfigError::invalid(field, "must not be blank")),
        Some(v) => Ok(v),
    }
}

fn endpoint(field: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        None => Ok(None),
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(Some(url)),
        Some(url) => Err(ConfigError::invalid(
            field,
            format!("`{url}` is not an http(s) URL"),
        )),
    }
}

/// Fluent construction of a [`CacheConfig`].
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.bucket = Some(bucket.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = Some(region.into());
        self
    }

    pub fn encryption_context(mut self, context: EncryptionContext) -> Self {
        self.config.encryption_context = Some(context);
        self
    }

    /// Add one attribute to the base encryption context.
    pub fn context_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let context = self.config.encryption_context.take().unwrap_or_default();
        self.config.encryption_context = Some(context.with(name, value));
        self
    }

    pub fn seed(mut self, key: impl Into<String>, value: CacheValue) -> Self {
        self.config.initial_cache.insert(key.into(), value);
        self
    }

    pub fn credentials(mut self, credentials: StaticCredentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    pub fn debug_telemetry_to_stderr(mut self, enabled: bool) -> Self {
        self.config.debug_telemetry_to_stderr = enabled;
        self
    }

    pub fn s3_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.s3_endpoint = Some(url.into());
        self
    }

    pub fn kms_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.kms_endpoint = Some(url.into());
        self
    }

    pub fn force_path_style(mut self, enabled: bool) -> Self {
        self.config.force_path_style = enabled;
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// Seeds travel through files as `key: "text"` or `key: null`.
mod seed_map {
    use crate::value::CacheValue;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::{BTreeMap, HashMap};

    pub fn serialize<S>(seeds: &HashMap<String, CacheValue>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut shown = BTreeMap::new();
        for (key, value) in seeds {
            let rendered = match value {
                CacheValue::Hit(plaintext) => Some(
                    std::str::from_utf8(plaintext)
                        .map_err(|_| S::Error::custom(format!("seed `{key}` is not UTF-8")))?,
                ),
                CacheValue::Absent => None,
            };
            shown.insert(key.as_str(), rendered);
        }
        shown.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<String, CacheValue>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, Option<String>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(key, value)| (key, CacheValue::from(value.map(String::into_bytes))))
            .collect())
    }
}

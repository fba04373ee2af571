//! Sealcache Core
//!
//! Shared vocabulary for sealcache: cached outcomes, encryption context,
//! validated configuration, the remote port traits and the telemetry
//! event shapes. This crate has minimal dependencies and performs no I/O
//! beyond reading configuration files.

pub mod config;
pub mod encryption;
pub mod error;
pub mod ports;
pub mod telemetry;
pub mod value;

pub use config::{CacheConfig, CacheConfigBuilder, CacheSettings, StaticCredentials};
pub use encryption::{EncryptionContext, KEY_ID_ATTRIBUTE};
pub use error::{ConfigError, Error, RemoteCall, RemoteError, Result};
pub use ports::{BlobSource, KeyService, ServiceTarget};
pub use telemetry::{EventLevel, EventPayload, LatencyMeasurement, TargetMetadata, TelemetryEvent};
pub use value::CacheValue;

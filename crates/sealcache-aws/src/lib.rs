//! AWS adapters for sealcache: S3 as the blob source, KMS as the key
//! service, and client bootstrap from validated settings.

pub mod client;
mod error;
pub mod kms;
pub mod s3;

pub use client::{ClientOptions, build_clients, connect, load_sdk_config};
pub use kms::KmsKeyService;
pub use s3::S3BlobSource;

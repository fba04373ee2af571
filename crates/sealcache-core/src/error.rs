//! Error types for sealcache.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Construction errors
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    // Remote call errors
    #[error("Fetching blob failed: {0}")]
    BlobFetch(RemoteError),

    #[error("Decrypting ciphertext failed: {0}")]
    Decrypt(RemoteError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required option `{field}`")]
    Missing { field: &'static str },

    #[error("invalid option `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// The remote operation a [`RemoteError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemoteCall {
    GetObject,
    Decrypt,
}

impl fmt::Display for RemoteCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteCall::GetObject => f.write_str("GetObject"),
            RemoteCall::Decrypt => f.write_str("Decrypt"),
        }
    }
}

/// A failure reported by the blob source or the key service.
///
/// `code` is the service error code when the service answered with one
/// (`NoSuchKey`, `AccessDenied`, ...). Transport failures carry no code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{operation}: {message}{}", code_suffix(.code))]
pub struct RemoteError {
    pub operation: RemoteCall,
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(operation: RemoteCall, message: impl Into<String>) -> Self {
        Self {
            operation,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

//! Telemetry event shapes emitted around remote calls.

use crate::ports::ServiceTarget;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

/// Severity of a telemetry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Error,
}

/// Names the remote call an event or measurement belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetMetadata {
    /// Public cache operation that issued the call.
    pub method: String,
    pub target_module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
    pub target_export: String,
    pub target_method: String,
}

impl TargetMetadata {
    pub fn new(method: &str, target: &ServiceTarget, target_method: &str) -> Self {
        Self {
            method: method.to_string(),
            target_module: target.module.clone(),
            target_version: target.version.clone(),
            target_export: target.export.clone(),
            target_method: target_method.to_string(),
        }
    }

    /// Dotted call name, e.g. `S3.GetObject`.
    pub fn call_name(&self) -> String {
        format!("{}.{}", self.target_export, self.target_method)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    /// Redacted call arguments.
    pub args: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A structured log event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub level: EventLevel,
    pub message: String,
    pub target_metadata: TargetMetadata,
    pub payload: EventPayload,
}

impl TelemetryEvent {
    pub fn info(message: impl Into<String>, target_metadata: TargetMetadata, args: Vec<Value>) -> Self {
        Self {
            level: EventLevel::Info,
            message: message.into(),
            target_metadata,
            payload: EventPayload {
                args,
                error: None,
                code: None,
            },
        }
    }

    pub fn error(message: impl Into<String>, target_metadata: TargetMetadata, args: Vec<Value>) -> Self {
        Self {
            level: EventLevel::Error,
            ..Self::info(message, target_metadata, args)
        }
    }

    /// Attach error detail to the payload.
    pub fn with_error(mut self, error: impl ToString, code: Option<&str>) -> Self {
        self.payload.error = Some(error.to_string());
        self.payload.code = code.map(str::to_string);
        self
    }
}

/// A latency gauge for one remote call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyMeasurement {
    pub name: &'static str,
    pub unit: &'static str,
    pub value: f64,
    pub target_metadata: TargetMetadata,
}

impl LatencyMeasurement {
    pub fn millis(elapsed: std::time::Duration, target_metadata: TargetMetadata) -> Self {
        Self {
            name: "latency",
            unit: "ms",
            value: elapsed.as_secs_f64() * 1000.0,
            target_metadata,
        }
    }
}

/// Render ciphertext for telemetry. Raw bytes never leave the pipeline.
pub fn redact_ciphertext(ciphertext: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(ciphertext)
}

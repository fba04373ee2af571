//! Observability hooks invoked around each remote call.
//!
//! Hooks are observers only. They return nothing, so they cannot change a
//! lookup's outcome, and the sinks here swallow their own I/O failures.

use sealcache_core::{EventLevel, LatencyMeasurement, TelemetryEvent};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info};

/// Receives telemetry from the retrieval pipeline.
pub trait ObservabilityHooks: Send + Sync {
    /// A structured log event: call starting, not found, or call failed.
    fn event(&self, event: &TelemetryEvent);

    /// Latency of one completed remote call.
    fn latency(&self, measurement: &LatencyMeasurement);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ObservabilityHooks for NoopHooks {
    fn event(&self, _event: &TelemetryEvent) {}

    fn latency(&self, _measurement: &LatencyMeasurement) {}
}

/// Forwards telemetry to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl ObservabilityHooks for TracingHooks {
    fn event(&self, event: &TelemetryEvent) {
        let call = event.target_metadata.call_name();
        let args = serde_json::Value::Array(event.payload.args.clone());
        match event.level {
            EventLevel::Info => info!(
                target: "sealcache::telemetry",
                call = %call,
                args = %args,
                error = event.payload.error.as_deref(),
                "{}",
                event.message
            ),
            EventLevel::Error => error!(
                target: "sealcache::telemetry",
                call = %call,
                args = %args,
                error = event.payload.error.as_deref(),
                code = event.payload.code.as_deref(),
                "{}",
                event.message
            ),
        }
    }

    fn latency(&self, measurement: &LatencyMeasurement) {
        debug!(
            target: "sealcache::latency",
            call = %measurement.target_metadata.call_name(),
            elapsed_ms = measurement.value,
            "remote call latency"
        );
    }
}

/// Writes each event and measurement as one JSON line.
pub struct JsonLinesHooks<W> {
    writer: Mutex<W>,
}

/// Mirrors telemetry to standard error.
pub type StderrHooks = JsonLinesHooks<std::io::Stderr>;

impl<W: Write + Send> JsonLinesHooks<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line<T: serde::Serialize>(&self, value: &T) {
        let Ok(line) = serde_json::to_string(value) else {
            return;
        };
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "{line}");
    }
}

impl StderrHooks {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> ObservabilityHooks for JsonLinesHooks<W> {
    fn event(&self, event: &TelemetryEvent) {
        self.write_line(event);
    }

    fn latency(&self, measurement: &LatencyMeasurement) {
        self.write_line(measurement);
    }
}

/// Dispatches to several sinks in order.
#[derive(Clone, Default)]
pub struct FanoutHooks {
    sinks: Vec<Arc<dyn ObservabilityHooks>>,
}

impl FanoutHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn ObservabilityHooks>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl ObservabilityHooks for FanoutHooks {
    fn event(&self, event: &TelemetryEvent) {
        for sink in &self.sinks {
            sink.event(event);
        }
    }

    fn latency(&self, measurement: &LatencyMeasurement) {
        for sink in &self.sinks {
            sink.latency(measurement);
        }
    }
}

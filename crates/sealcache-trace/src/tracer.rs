//! Tracer initialization and configuration.

use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource, runtime,
    trace::{RandomIdGenerator, Sampler},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Failed to initialize tracer: {0}")]
    Init(String),
}

/// OTLP exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtlpConfig {
    pub endpoint: String,
    pub protocol: Protocol,
    pub timeout_seconds: u64,
}

impl Default for OtlpConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4317".to_string(),
            protocol: Protocol::Grpc,
            timeout_seconds: 10,
        }
    }
}

/// OTLP protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Grpc,
    HttpProtobuf,
}

/// Log line format on standard error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    pub service_name: String,
    pub service_version: String,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
    pub log_format: LogFormat,
    pub sample_rate: f64,
    pub otlp: Option<OtlpConfig>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "sealcache".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            default_filter: "warn,sealcache=info".to_string(),
            log_format: LogFormat::Pretty,
            sample_rate: 1.0,
            otlp: None,
        }
    }
}

/// Install the global subscriber. OTLP export is added when configured.
pub fn init_tracer(config: &TracingConfig) -> Result<(), TracerError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))
        .map_err(|e| TracerError::Init(e.to_string()))?;

    let Some(otlp_config) = &config.otlp else {
        return tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer(config.log_format))
            .try_init()
            .map_err(|e| TracerError::Init(e.to_string()));
    };

    let timeout = Duration::from_secs(otlp_config.timeout_seconds);
    let exporter = match otlp_config.protocol {
        Protocol::Grpc => opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&otlp_config.endpoint)
            .with_timeout(timeout)
            .build(),
        Protocol::HttpProtobuf => opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(&otlp_config.endpoint)
            .with_timeout(timeout)
            .build(),
    }
    .map_err(|e| TracerError::Init(e.to_string()))?;

    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(sampler(config.sample_rate))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new(vec![
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", config.service_version.clone()),
        ]))
        .build();

    let tracer = provider.tracer("sealcache");
    global::set_tracer_provider(provider);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(config.log_format))
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()
        .map_err(|e| TracerError::Init(e.to_string()))
}

fn sampler(rate: f64) -> Sampler {
    if rate >= 1.0 {
        Sampler::AlwaysOn
    } else if rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(rate)
    }
}

// Logs go to stderr so stdout stays clean for looked-up values.
fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    }
}

/// Shutdown the tracer and flush remaining spans.
pub fn shutdown_tracer() {
    global::shutdown_tracer_provider();
}

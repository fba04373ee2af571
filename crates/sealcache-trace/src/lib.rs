//! Tracing integration for sealcache.
//!
//! Installs the process-wide subscriber (optionally exporting over OTLP)
//! and builds the child spans that bracket each remote call of a lookup.

pub mod spans;
pub mod tracer;

pub use spans::{blob_fetch_span, decrypt_span, lookup_span, mark_error};
pub use tracer::{
    LogFormat, OtlpConfig, Protocol, TracerError, TracingConfig, init_tracer, shutdown_tracer,
};

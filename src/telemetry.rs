//! OpenTelemetry tracing export
//!
//! Spans are exported over OTLP when `OTEL_EXPORTER_OTLP_ENDPOINT` is set; the
//! exporter reads the endpoint from the environment itself.

use opentelemetry::KeyValue;
use opentelemetry_sdk::{runtime, trace, Resource};
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::registry::LookupSpan;

use crate::error::{Error, Result};

/// Service name reported on exported spans
pub const SERVICE_NAME: &str = "terra-operator";

/// Build the OTLP tracing layer for `subscriber`
pub fn init_telemetry<S>(_subscriber: &S) -> Result<OpenTelemetryLayer<S, trace::Tracer>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let instance = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string());

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic())
        .with_trace_config(trace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", SERVICE_NAME),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("service.instance.id", instance),
        ])))
        .install_batch(runtime::Tokio)
        .map_err(|e| Error::TelemetryError(e.to_string()))?;

    Ok(tracing_opentelemetry::layer().with_tracer(tracer))
}

/// Flush and stop the global tracer provider
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

//! OpenTelemetry export, compiled in with the `telemetry` feature
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP gRPC endpoint (e.g. http://localhost:4317)
//! - `OTEL_SERVICE_NAME`: service name (default: sajilo-waste)

use anyhow::Result;
use tracing_subscriber::{Layer, Registry};

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Tracing layer exporting spans, when an endpoint is configured.
///
/// Returns a note to log once the subscriber is installed, since nothing
/// can be logged before that.
pub fn layer() -> Result<(Option<BoxedLayer>, Option<String>)> {
    let Ok(endpoint) = std::env::var(ENDPOINT_VAR) else {
        return Ok((None, None));
    };

    #[cfg(feature = "telemetry")]
    {
        let layer = otlp_layer(&endpoint)?;
        Ok((Some(layer), Some(format!("Exporting traces to {}", endpoint))))
    }

    #[cfg(not(feature = "telemetry"))]
    {
        Ok((
            None,
            Some(format!(
                "{} is {} but the daemon was built without the 'telemetry' feature",
                ENDPOINT_VAR, endpoint
            )),
        ))
    }
}

#[cfg(feature = "telemetry")]
fn otlp_layer(endpoint: &str) -> Result<BoxedLayer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{runtime, trace::TracerProvider, Resource};

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "sajilo-waste".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name,
        )]))
        .build();

    let tracer = provider.tracer("sajilo-waste");
    opentelemetry::global::set_tracer_provider(provider);

    Ok(Box::new(tracing_opentelemetry::layer().with_tracer(tracer)))
}

/// Flush pending spans
pub fn shutdown() {
    #[cfg(feature = "telemetry")]
    opentelemetry::global::shutdown_tracer_provider();
}

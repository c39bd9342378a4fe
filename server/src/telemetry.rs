//! Tracing setup: console output always, OTLP export when a collector answers.

use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_SERVICE_NAME: &str = "foodgram-server";

/// Quick TCP probe so a missing collector does not stall every export.
fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` controls filtering (default `info`). If
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set and reachable, spans and log events
/// are also exported over OTLP/gRPC under `OTEL_SERVICE_NAME`.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer();

    let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

    let mut otel_trace_layer = None;
    let mut otel_log_layer = None;
    let mut status = "OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only".to_string();

    if let Some(endpoint) = endpoint.as_deref() {
        if collector_reachable(endpoint) {
            let resource = opentelemetry_sdk::Resource::builder()
                .with_service_name(service_name.clone())
                .build();

            let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build();
            let log_exporter = opentelemetry_otlp::LogExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build();

            match (trace_exporter, log_exporter) {
                (Ok(trace_exporter), Ok(log_exporter)) => {
                    let trace_provider = SdkTracerProvider::builder()
                        .with_batch_exporter(trace_exporter)
                        .with_resource(resource.clone())
                        .build();
                    let tracer = trace_provider.tracer(DEFAULT_SERVICE_NAME);
                    opentelemetry::global::set_tracer_provider(trace_provider);
                    otel_trace_layer = Some(tracing_opentelemetry::layer().with_tracer(tracer));

                    let log_provider = SdkLoggerProvider::builder()
                        .with_batch_exporter(log_exporter)
                        .with_resource(resource)
                        .build();
                    otel_log_layer = Some(OpenTelemetryTracingBridge::new(&log_provider));

                    status = format!(
                        "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                        endpoint, service_name
                    );
                }
                (Err(e), _) => {
                    status = format!("Failed to create OTLP trace exporter for {}: {}", endpoint, e);
                }
                (_, Err(e)) => {
                    status = format!("Failed to create OTLP log exporter for {}: {}", endpoint, e);
                }
            }
        } else {
            status = format!(
                "OpenTelemetry endpoint {} not reachable, using console logging only",
                endpoint
            );
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .init();

    tracing::info!("{}", status);
}

#[cfg(test)]
mod tests {
    use super::collector_reachable;

    #[test]
    fn test_unresolvable_collector_is_unreachable() {
        assert!(!collector_reachable("http://collector.invalid:4317"));
        assert!(!collector_reachable("not a host"));
    }
}

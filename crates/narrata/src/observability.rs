//! Tracing subscriber setup for the binary.

use crate::LoggingConfig;
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use opentelemetry_stdout::SpanExporter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter, format and span export for one process.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to exported spans
    pub service_name: String,
    /// Service version attached to exported spans
    pub service_version: String,
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// One JSON object per log line
    pub json_logs: bool,
    /// Print finished spans to stdout through OpenTelemetry
    pub otel_stdout: bool,
}

impl ObservabilityConfig {
    /// Plain-text `info` logging for `service_name`, no span export.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            otel_stdout: false,
        }
    }

    /// Takes level, format and export from the `[logging]` section.
    pub fn from_logging(service_name: impl Into<String>, logging: &LoggingConfig) -> Self {
        Self::new(service_name)
            .with_log_level(logging.level().clone())
            .with_json_logs(*logging.json())
            .with_otel_stdout(*logging.otel_stdout())
    }

    /// Set the service version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Set the fallback filter directive.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Switch to JSON log lines.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Enable the stdout span exporter.
    pub fn with_otel_stdout(mut self, enabled: bool) -> Self {
        self.otel_stdout = enabled;
        self
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

fn span_exporter(config: &ObservabilityConfig) -> SdkTracerProvider {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes(vec![KeyValue::new(
            "service.version",
            config.service_version.clone(),
        )])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_resource(resource)
        .build();
    global::set_tracer_provider(provider.clone());
    provider
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a subscriber is
/// already installed.
pub fn init_observability_with_config(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };

    let otel_layer = config.otel_stdout.then(|| {
        let tracer = span_exporter(&config).tracer(config.service_name.clone());
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    tracing::debug!(
        service = %config.service_name,
        version = %config.service_version,
        json = config.json_logs,
        otel = config.otel_stdout,
        "Logging initialised"
    );
    Ok(())
}

/// Ends span export.
///
/// The stdout exporter flushes on drop; nothing else is buffered.
pub fn shutdown_observability() {
    tracing::debug!("Observability shut down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_logging_copies_section() {
        let logging = LoggingConfig::default()
            .with_level("narrata_pipeline=debug")
            .with_json(true);

        let config = ObservabilityConfig::from_logging("narrata", &logging);

        assert_eq!(config.log_level, "narrata_pipeline=debug");
        assert!(config.json_logs);
        assert!(!config.otel_stdout);
        assert_eq!(config.service_name, "narrata");
    }
}

//! Log and trace pipeline for the rescue runtime.
//!
//! Call [`init_tracing`] once at process startup. Mission, navigator and
//! recovery events are emitted through `tracing`; this module decides where
//! they go.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `RESCUE_LOG_FORMAT=json` | Emit newline-delimited JSON logs instead of compact lines. |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set, spans are also exported over OTLP/HTTP. |
//!
//! # Example
//!
//! ```rust,no_run
//! let _guard = rescue_runtime::telemetry::init_tracing("rescue");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the console log format.
pub const LOG_FORMAT_VAR: &str = "RESCUE_LOG_FORMAT";

/// Console log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// `"json"` (any case) selects JSON; anything else, or nothing, is compact.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }

    fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_VAR).ok().as_deref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Install the global `tracing` subscriber.
///
/// The returned [`TracerProviderGuard`] must be held until the process
/// exits; dropping it flushes any exported spans.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let provider = build_provider(service_name);

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("rescue")));
    let fmt_layer = match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(fmt_layer)
        .init();

    TracerProviderGuard(provider)
}

// ─────────────────────────────────────────────────────────────────────────────
// RAII guard
// ─────────────────────────────────────────────────────────────────────────────

/// Shuts the OTLP provider down on drop. Holds nothing when export is off.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl TracerProviderGuard {
    /// Whether spans are being exported.
    pub fn is_exporting(&self) -> bool {
        self.0.is_some()
    }
}

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[rescue] trace provider shutdown failed: {e}");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

/// `None` when no collector endpoint is configured or the exporter fails to
/// build; the failure is printed and console logging carries on.
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[rescue] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            .with_simple_exporter(exporter)
            .build(),
    )
}

//! Log subscriber for the `cued` binary.
//!
//! Human-readable events go to stderr so `--json` output on stdout stays
//! clean. `cued run --otel` also exports spans (one per handled update)
//! through the OpenTelemetry stdout exporter.
//!
//! ```no_run
//! let _guard = cued_observe::tracing_setup::init_tracing("info,cued=debug", false)?;
//! tracing::info!("ready");
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

use std::io::IsTerminal;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Instrumentation scope reported on exported spans.
const TRACER_NAME: &str = "cued";

/// Keeps span export alive; flushes and shuts the exporter down on drop.
#[must_use = "dropping the guard stops span export"]
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl TracingGuard {
    pub fn exports_spans(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "span exporter did not shut down cleanly");
            }
        }
    }
}

/// `RUST_LOG` when set and valid, else `default_directive`.
pub fn build_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(
    default_directive: &str,
    enable_otel: bool,
) -> Result<TracingGuard, Box<dyn std::error::Error + Send + Sync>> {
    let stderr = std::io::stderr();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(stderr.is_terminal())
        .with_writer(std::io::stderr)
        .with_target(false);

    let provider = enable_otel.then(|| {
        SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build()
    });
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(TRACER_NAME)));

    tracing_subscriber::registry()
        .with(build_filter(default_directive))
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(TracingGuard { provider })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_falls_back_to_default() {
        // SAFETY: no other test in this crate reads or writes RUST_LOG.
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert_eq!(build_filter("warn").to_string(), "warn");
        assert_eq!(build_filter("info,cued=debug").to_string(), "info,cued=debug");
    }

    #[test]
    fn test_guard_without_exporter_drops_quietly() {
        let guard = TracingGuard { provider: None };
        assert!(!guard.exports_spans());
        drop(guard);
    }

    #[test]
    fn test_guard_shuts_exporter_down() {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let guard = TracingGuard {
            provider: Some(provider),
        };
        assert!(guard.exports_spans());
        drop(guard);
    }
}

//! Prometheus metrics for listing-service.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

/// Handle to the recorder behind the `metrics` facade (HTTP middleware).
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Histogram for database query duration by operation.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "listing_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Counter for LLM attempts by outcome (`ok`, `provider_error`).
pub static LLM_ATTEMPTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "listing_llm_attempts_total",
        "Total number of LLM generation attempts",
        &["provider", "outcome"]
    )
    .expect("Failed to register LLM_ATTEMPTS")
});

/// Histogram for LLM provider latency.
pub static LLM_PROVIDER_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "listing_llm_provider_latency_seconds",
        "LLM provider call latency in seconds",
        &["provider"],
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    )
    .expect("Failed to register LLM_PROVIDER_LATENCY")
});

/// Counter for returned text variants by source (`model`, `fallback`).
pub static TEXT_VARIANTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "listing_text_variants_total",
        "Total number of text variants returned",
        &["source"]
    )
    .expect("Failed to register TEXT_VARIANTS")
});

/// Counter for zip archives by status.
pub static ARCHIVES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "listing_archives_total",
        "Total number of zip archives requested",
        &["status"]
    )
    .expect("Failed to register ARCHIVES")
});

/// Install the facade recorder and touch every registry metric so they
/// show up in `/metrics` before first use. Safe to call more than once.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if let Err(e) = metrics::set_global_recorder(recorder) {
            tracing::warn!(error = %e, "Metrics recorder already installed");
        }
        handle
    });

    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&LLM_ATTEMPTS);
    Lazy::force(&LLM_PROVIDER_LATENCY);
    Lazy::force(&TEXT_VARIANTS);
    Lazy::force(&ARCHIVES);
}

pub fn record_llm_attempt(provider: &str, outcome: &str) {
    LLM_ATTEMPTS.with_label_values(&[provider, outcome]).inc();
}

pub fn record_text_variants(source: &str, count: usize) {
    if count > 0 {
        TEXT_VARIANTS
            .with_label_values(&[source])
            .inc_by(count as f64);
    }
}

pub fn record_archive(status: &str) {
    ARCHIVES.with_label_values(&[status]).inc();
}

/// Render the default registry and the facade recorder in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        buffer.clear();
    }
    let mut output = String::from_utf8(buffer).unwrap_or_default();
    if let Some(handle) = METRICS_HANDLE.get() {
        output.push_str(&handle.render());
    }
    output
}

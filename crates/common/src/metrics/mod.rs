//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming for the ranking pipeline.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics prefix for all TalentFlow metrics
pub const METRICS_PREFIX: &str = "talentflow";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_rankings_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of ranking computations"
    );

    describe_histogram!(
        format!("{}_ranking_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Ranking computation latency in seconds"
    );

    describe_gauge!(
        format!("{}_ranking_iterations", METRICS_PREFIX),
        Unit::Count,
        "Iterations used by the last ranking computation"
    );

    describe_counter!(
        format!("{}_projections_built_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of projection builds"
    );
}

/// Record an HTTP request
pub fn record_request(path: &'static str, duration_secs: f64) {
    counter!(format!("{}_requests_total", METRICS_PREFIX), "path" => path).increment(1);
    histogram!(format!("{}_request_duration_seconds", METRICS_PREFIX), "path" => path)
        .record(duration_secs);
}

/// Record a ranking computation
pub fn record_ranking(algorithm: &'static str, duration_secs: f64, iterations: usize) {
    counter!(format!("{}_rankings_total", METRICS_PREFIX), "algorithm" => algorithm).increment(1);
    histogram!(format!("{}_ranking_duration_seconds", METRICS_PREFIX), "algorithm" => algorithm)
        .record(duration_secs);
    gauge!(format!("{}_ranking_iterations", METRICS_PREFIX), "algorithm" => algorithm)
        .set(iterations as f64);
}

/// Record a projection build
pub fn record_projection_build(scheme: &'static str) {
    counter!(format!("{}_projections_built_total", METRICS_PREFIX), "scheme" => scheme)
        .increment(1);
}

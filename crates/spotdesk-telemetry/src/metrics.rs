//! Prometheus metrics for spotdesk.
//!
//! Covers order submissions, their outcomes, form rejections and the
//! exchange clock offset.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a startup bug. These panics only occur
//! during static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, register_int_gauge,
    CounterVec, Encoder, HistogramVec, IntCounter, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Orders submitted to the exchange.
/// Labels: order_type (MARKET/LIMIT/STOP_LIMIT)
pub static ORDER_ATTEMPTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "spotdesk_order_attempts_total",
        "Orders submitted to the exchange",
        &["order_type"]
    )
    .unwrap()
});

/// Order outcomes.
/// Labels: outcome (success/failure)
pub static ORDER_RESULTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "spotdesk_order_results_total",
        "Order outcomes reported by the exchange",
        &["outcome"]
    )
    .unwrap()
});

/// Round trip of a placement, including any resync and retry.
pub static ORDER_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "spotdesk_order_latency_ms",
        "Order placement round trip in milliseconds",
        &["order_type"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Order forms rejected before reaching the exchange.
pub static VALIDATION_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "spotdesk_validation_rejected_total",
        "Order forms rejected by validation"
    )
    .unwrap()
});

/// Resubmissions after a timestamp rejection.
pub static CLOCK_SKEW_RETRIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "spotdesk_clock_skew_retries_total",
        "Orders resubmitted after a clock resync"
    )
    .unwrap()
});

/// Server minus local clock, as of the last successful sync.
pub static TIME_OFFSET_MS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "spotdesk_time_offset_ms",
        "Exchange server time minus local time in milliseconds"
    )
    .unwrap()
});

/// Outcome label for accepted orders.
pub const OUTCOME_SUCCESS: &str = "success";
/// Outcome label for rejected or failed orders.
pub const OUTCOME_FAILURE: &str = "failure";

/// Metrics helper for recording values.
pub struct Metrics;

impl Metrics {
    /// Record an order sent to the exchange.
    pub fn order_attempt(order_type: &str) {
        ORDER_ATTEMPTS_TOTAL.with_label_values(&[order_type]).inc();
    }

    /// Record an order outcome.
    pub fn order_result(outcome: &str) {
        ORDER_RESULTS_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn order_latency(order_type: &str, latency_ms: f64) {
        ORDER_LATENCY_MS
            .with_label_values(&[order_type])
            .observe(latency_ms);
    }

    pub fn validation_rejected() {
        VALIDATION_REJECTED_TOTAL.inc();
    }

    pub fn clock_skew_retry() {
        CLOCK_SKEW_RETRIES_TOTAL.inc();
    }

    /// Update the clock offset gauge.
    pub fn time_offset(offset_ms: i64) {
        TIME_OFFSET_MS.set(offset_ms);
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn encode_metrics() -> TelemetryResult<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}

/// Content type for the text exposition format.
pub fn metrics_content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_counters_increment() {
        let before = ORDER_ATTEMPTS_TOTAL.with_label_values(&["STOP_LIMIT"]).get();
        Metrics::order_attempt("STOP_LIMIT");
        Metrics::order_attempt("STOP_LIMIT");
        let after = ORDER_ATTEMPTS_TOTAL.with_label_values(&["STOP_LIMIT"]).get();
        assert!(after - before >= 2.0);

        let before = ORDER_RESULTS_TOTAL.with_label_values(&[OUTCOME_FAILURE]).get();
        Metrics::order_result(OUTCOME_FAILURE);
        assert!(ORDER_RESULTS_TOTAL.with_label_values(&[OUTCOME_FAILURE]).get() > before);
    }

    #[test]
    fn test_skew_and_validation_counters() {
        let skew_before = CLOCK_SKEW_RETRIES_TOTAL.get();
        let rejected_before = VALIDATION_REJECTED_TOTAL.get();

        Metrics::clock_skew_retry();
        Metrics::validation_rejected();

        assert!(CLOCK_SKEW_RETRIES_TOTAL.get() > skew_before);
        assert!(VALIDATION_REJECTED_TOTAL.get() > rejected_before);
    }

    #[test]
    fn test_encode_includes_registered_metrics() {
        Metrics::time_offset(-42);
        Metrics::order_latency("MARKET", 12.5);

        let text = encode_metrics().unwrap();
        assert!(text.contains("spotdesk_time_offset_ms"));
        assert!(text.contains("spotdesk_order_latency_ms_bucket"));
        assert!(metrics_content_type().starts_with("text/plain"));
    }
}

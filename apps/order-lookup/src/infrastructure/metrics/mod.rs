//! Prometheus Metrics Module
//!
//! Exposes application metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Traffic**: Counts of requests received, responses emitted, and
//!   no-match outcomes per streaming mode
//! - **Sessions**: Active and total session counts
//! - **Latency**: Match and session duration histograms
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if called more than once or if the recorder cannot be installed.
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let builder = PrometheusBuilder::new();
            let handle = builder
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    // Traffic counters
    describe_counter!(
        "order_lookup_requests_total",
        "Total item queries received from clients"
    );
    describe_counter!(
        "order_lookup_responses_total",
        "Total matched responses streamed to clients"
    );
    describe_counter!(
        "order_lookup_no_match_total",
        "Total queries that matched no catalog entry"
    );

    // Session metrics
    describe_counter!(
        "order_lookup_sessions_total",
        "Total streaming sessions opened"
    );
    describe_gauge!(
        "order_lookup_sessions_active",
        "Number of streaming sessions currently open"
    );
    describe_histogram!(
        "order_lookup_session_duration_seconds",
        "Time from session open to stream completion"
    );
    describe_histogram!(
        "order_lookup_match_duration_seconds",
        "Time to match one query and emit its response batch"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Metric labels for streaming modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// One request, a stream of responses.
    ServerStreaming,
    /// Requests and responses both streamed.
    Bidirectional,
}

impl StreamMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::ServerStreaming => "server_streaming",
            Self::Bidirectional => "bidirectional",
        }
    }
}

/// Record an item query received from a client.
pub fn record_request(mode: StreamMode) {
    counter!(
        "order_lookup_requests_total",
        "mode" => mode.as_str()
    )
    .increment(1);
}

/// Record a matched response streamed to a client.
pub fn record_response(mode: StreamMode) {
    counter!(
        "order_lookup_responses_total",
        "mode" => mode.as_str()
    )
    .increment(1);
}

/// Record queries that produced zero matches.
pub fn record_no_matches(mode: StreamMode, count: u64) {
    counter!(
        "order_lookup_no_match_total",
        "mode" => mode.as_str()
    )
    .increment(count);
}

/// Record the time one query took to match and emit its batch.
pub fn record_match_duration(mode: StreamMode, duration: Duration) {
    histogram!(
        "order_lookup_match_duration_seconds",
        "mode" => mode.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Record a session opening.
pub fn record_session_started(mode: StreamMode) {
    counter!(
        "order_lookup_sessions_total",
        "mode" => mode.as_str()
    )
    .increment(1);
    gauge!(
        "order_lookup_sessions_active",
        "mode" => mode.as_str()
    )
    .increment(1.0);
}

/// Record a session ending with its total duration.
pub fn record_session_closed(mode: StreamMode, duration: Duration) {
    gauge!(
        "order_lookup_sessions_active",
        "mode" => mode.as_str()
    )
    .decrement(1.0);
    histogram!(
        "order_lookup_session_duration_seconds",
        "mode" => mode.as_str()
    )
    .record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_mode_as_str() {
        assert_eq!(StreamMode::ServerStreaming.as_str(), "server_streaming");
        assert_eq!(StreamMode::Bidirectional.as_str(), "bidirectional");
    }
}

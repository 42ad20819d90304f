//! Metrics collection.
//!
//! # Metrics
//! - `runner_producers_invoked_total` (counter): factories called
//! - `runner_resolution_stalls_total` (counter): passes that made no progress
//! - `runner_stalled_producers` (gauge): producers left pending by the last stall
//! - `runner_closers_total` (counter): closers invoked, by `kind`
//! - `runner_close_timeouts_total` (counter): delayed closers that timed out
//! - `runner_teardown_duration_seconds` (histogram): time spent in teardown

use std::time::Instant;

/// Record one factory invocation.
pub fn record_producer_invoked(producer: &str) {
    ::metrics::counter!("runner_producers_invoked_total", "producer" => producer.to_string())
        .increment(1);
}

/// Record a resolution pass that resolved nothing.
pub fn record_stall(pending: usize) {
    ::metrics::counter!("runner_resolution_stalls_total").increment(1);
    ::metrics::gauge!("runner_stalled_producers").set(pending as f64);
}

/// Record a closer about to be invoked.
pub fn record_closer(kind: &'static str) {
    ::metrics::counter!("runner_closers_total", "kind" => kind).increment(1);
}

pub fn record_close_timeout() {
    ::metrics::counter!("runner_close_timeouts_total").increment(1);
}

/// Record the duration of a teardown that started at `started`.
pub fn record_teardown(started: Instant) {
    ::metrics::histogram!("runner_teardown_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}

//! Metrics collection.
//!
//! # Metrics
//! - `routeflow_transitions_total` (counter): settled transitions by outcome
//! - `routeflow_loader_runs_total` (counter): loader/action runs by kind, result
//! - `routeflow_loader_duration_seconds` (histogram): loader/action latency
//! - `routeflow_pattern_cache_entries` (gauge): compiled patterns cached
//! - `routeflow_pattern_cache_overflow_total` (counter): uncached compilations
//! - `routeflow_fetcher_submissions_total` (counter): fetcher work by kind
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host installs an exporter
//! - Without a recorder every call is a no-op

use std::time::Duration;

pub fn record_transition(outcome: &'static str) {
    ::metrics::counter!("routeflow_transitions_total", "outcome" => outcome).increment(1);
}

pub fn record_data_run(kind: &'static str, result: &'static str, elapsed: Duration) {
    ::metrics::counter!("routeflow_loader_runs_total", "kind" => kind, "result" => result).increment(1);
    ::metrics::histogram!("routeflow_loader_duration_seconds", "kind" => kind).record(elapsed.as_secs_f64());
}

pub fn record_pattern_cache_size(size: usize) {
    ::metrics::gauge!("routeflow_pattern_cache_entries").set(size as f64);
}

pub fn record_pattern_cache_overflow() {
    ::metrics::counter!("routeflow_pattern_cache_overflow_total").increment(1);
}

pub fn record_fetcher(kind: &'static str) {
    ::metrics::counter!("routeflow_fetcher_submissions_total", "kind" => kind).increment(1);
}

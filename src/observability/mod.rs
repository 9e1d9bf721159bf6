//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (transition lifecycle, redirects, cache overflow)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Binaries install:
//!     → logging.rs (subscriber, filter, output format)
//! ```
//!
//! # Design Decisions
//! - Structured fields (generation, route_id, pathname) on every event
//! - Metrics are cheap no-ops unless an exporter is installed

pub mod logging;
pub mod metrics;

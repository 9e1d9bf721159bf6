//! Resilience helpers for route authors.
//!
//! # Data Flow
//! ```text
//! Loader call:
//!     → timeouts.rs (enforce deadline)
//!     → On elapse: DataError::Failed { status: 504 }
//!     → data strategy records it like any other loader failure
//! ```

pub mod timeouts;

pub use timeouts::{with_timeout, TIMEOUT_STATUS};

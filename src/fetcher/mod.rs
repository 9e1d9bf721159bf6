//! Fetcher subsystem: data interactions that never change the location.
//!
//! # Data Flow
//! ```text
//! submit_fetcher(key, href, submission)
//!     → registry.rs (supersede prior work on key)
//!     → target route's action
//!     → revalidation decision against the committed state
//!     → loaders → merge into committed state if no navigation committed meanwhile
//!
//! load_fetcher(key, href)
//!     → registry.rs → leaf route's loader → fetcher data
//! ```
//!
//! # Design Decisions
//! - Keys are independent; only work on the same key is serialized
//! - Same last-writer-wins rule as navigations, via per-key generations
//! - Redirects become regular navigations

pub mod registry;
pub mod runner;

pub use registry::{Fetcher, FetcherRegistry, FetcherState};
pub use runner::{FetcherError, FetcherOutcome, FetcherResult};

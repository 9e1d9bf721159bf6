//! Data subsystem: loaders, actions and where their failures land.
//!
//! # Data Flow
//! ```text
//! Transition (candidate chain + diff)
//!     → strategy.rs (action first, then plan)
//!     → revalidation.rs (shared routes: reload or keep?)
//!     → strategy.rs (loaders run concurrently)
//!     → boundary.rs (failures → nearest error boundary)
//!     → ResolvedData | Redirect
//! ```
//!
//! # Design Decisions
//! - Loaders and actions are opaque async functions; payloads stay `serde_json::Value`
//! - A failure never discards sibling data
//! - Redirects are values, not panics or special errors outside `DataError`

pub mod boundary;
pub mod revalidation;
pub mod strategy;
pub mod types;

pub use boundary::{nearest_boundary, Failures};
pub use revalidation::{default_should_revalidate, should_revalidate};
pub use strategy::{resolve, run_loaders, DataRequest, LoaderBatch, LoaderOutput, Resolution, ResolvedData};
pub use types::*;

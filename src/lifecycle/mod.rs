//! Lifecycle of in-flight work.
//!
//! # Data Flow
//! ```text
//! New transition / fetcher submission:
//!     → generation.advance() (claim the latest generation)
//!     → previous CancelHandle.cancel() (raise the old flag)
//!     → CancelSignal handed to hooks, loaders, actions
//!
//! At every resumption point:
//!     → generation.is_current(g)? continue : discard result
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative: user code is never interrupted
//! - Identity of work is a generation number, not a pointer comparison
//! - A superseded unit of work may finish, but can never publish

pub mod cancel;

pub use cancel::{CancelHandle, CancelSignal, GenerationCounter};

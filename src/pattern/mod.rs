//! Path pattern subsystem.
//!
//! # Data Flow
//! ```text
//! Route tree build:
//!     composite pattern ("/posts/:id")
//!     → cache.rs (bounded, first-writer-wins lookup)
//!     → compiler.rs (segments + ordered param names)
//!     → Arc<CompiledPattern> shared by every match attempt
//!
//! Link building:
//!     pattern + params → generate.rs → "/posts/42"
//! ```
//!
//! # Design Decisions
//! - Compilation is pure and infallible
//! - The cache belongs to one route tree and dies with it
//! - Matching never suspends and never allocates beyond the captured params

pub mod cache;
pub mod compiler;
pub mod generate;

pub use cache::{PatternCompiler, DEFAULT_CACHE_CAPACITY};
pub use compiler::{decode_segment, CompiledPattern, PathMatch, Segment, SplitPath, WILDCARD_PARAM};
pub use generate::{generate_path, PatternError};

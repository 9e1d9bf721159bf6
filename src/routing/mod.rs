//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route tree construction (once per tree):
//!     RouteNode[]
//!     → tree.rs (validate ids, build RouteIndex)
//!     → flatten.rs (expand to chains, score, stable sort)
//!     → Freeze as immutable RouteTree
//!
//! Location lookup:
//!     href → location.rs (pathname, search, hash, key)
//!     → matcher.rs (strip basename, walk ranked chains)
//!     → Return: LocationMatch (root-to-leaf matches + query) or None
//! ```
//!
//! # Design Decisions
//! - Trees are immutable; patching produces a new tree
//! - Deterministic: same tree and path always yield the same chain
//! - First match wins (ordered by rank)

pub mod flatten;
pub mod location;
pub mod matcher;
pub mod tree;

pub use flatten::{ChainEntry, FlattenedChain};
pub use location::{Location, Query};
pub use matcher::{match_routes, LocationMatch, Params, RouteMatch};
pub use tree::{
    Action, Hook, Loader, MatchOptions, RevalidatePolicy, RouteIndex, RouteNode, RouteTree, TreeError,
    TreeResult,
};

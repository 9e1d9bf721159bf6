//! Navigation subsystem: the transition state machine.
//!
//! # Data Flow
//! ```text
//! NavigationRequest (location + PUSH/REPLACE/POP [+ submission])
//!     → router.rs (claim generation, cancel in-flight transition)
//!     → matcher (candidate chain)
//!     → diff.rs (leaving / entering / shared)
//!     → hooks.rs (will-leave deepest-first, then will-enter shallowest-first)
//!     → data strategy (action, loaders, revalidation)
//!     → router.rs (generation check, atomic swap of MatchedState)
//!     → events.rs (Started / Settled)
//! ```
//!
//! # Design Decisions
//! - The committed state is the only shared mutable cell; it is swapped whole
//! - Cancellation is cooperative: user code finishes, stale results are dropped
//! - Redirects restart the flow with replace semantics
//! - The history stack belongs to the caller; see `history.rs`

pub mod diff;
pub mod events;
pub mod history;
pub mod hooks;
pub mod router;
pub mod state;

pub use diff::{diff_matches, TransitionDiff};
pub use events::{SettleKind, TransitionEvent, TransitionEvents};
pub use history::{History, HistoryAction, MemoryHistory, NavigationRequest};
pub use hooks::{HookArgs, HookOutcome};
pub use router::{NavigationOutcome, Router, RouterError, RouterResult};
pub use state::{MatchedState, NavigationPhase};

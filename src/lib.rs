//! Nested client-side routing: pattern matching, ranked route chains,
//! transitions with cooperative cancellation, and loader/action data flow.

pub mod config;
pub mod data;
pub mod fetcher;
pub mod lifecycle;
pub mod navigation;
pub mod observability;
pub mod pattern;
pub mod resilience;
pub mod routing;

pub use config::AppConfig;
pub use data::{DataError, DataResult, Redirect, RouteFailure, Submission};
pub use navigation::{
    History, HistoryAction, MatchedState, MemoryHistory, NavigationOutcome, NavigationRequest, Router, RouterError,
};
pub use routing::{match_routes, Location, RouteNode, RouteTree};

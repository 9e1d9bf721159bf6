//! Committed router state and the navigation phase.
//!
//! # States
//! ```text
//! Idle → Pending: a transition starts
//! Pending → Committing: data resolved, about to swap state
//! Committing → Idle: new state published
//! Pending → Idle: aborted or redirected (redirect starts a new Pending)
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::data::RouteFailure;
use crate::routing::{Location, Params, Query, RouteMatch};

/// Everything the rendering collaborator needs for the current location.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedState {
    /// Generation of the transition that produced this state.
    pub generation: u64,
    /// Route table revision this state was matched against.
    pub tree_version: u64,
    pub location: Location,
    pub query: Query,
    /// Root to leaf.
    pub matches: Vec<RouteMatch>,
    /// Loader data by route id.
    pub loader_data: HashMap<String, Value>,
    /// Result of the last submission's action, by route id.
    pub action_data: HashMap<String, Value>,
    /// Failures by error-boundary route id.
    pub errors: HashMap<String, RouteFailure>,
    /// A failure no boundary caught; the whole tree is in error.
    pub fatal_error: Option<RouteFailure>,
    /// Nothing matched the location.
    pub no_match: bool,
    /// At least one transition has committed.
    pub initialized: bool,
}

impl MatchedState {
    /// State of a router that has not navigated yet.
    pub fn empty(location: Location) -> Self {
        let query = location.query();
        Self {
            generation: 0,
            tree_version: 0,
            location,
            query,
            matches: Vec::new(),
            loader_data: HashMap::new(),
            action_data: HashMap::new(),
            errors: HashMap::new(),
            fatal_error: None,
            no_match: false,
            initialized: false,
        }
    }

    pub fn data(&self, route_id: &str) -> Option<&Value> {
        self.loader_data.get(route_id)
    }

    pub fn error(&self, route_id: &str) -> Option<&RouteFailure> {
        self.errors.get(route_id)
    }

    pub fn route_ids(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.route_id.as_str()).collect()
    }

    /// Params of the leaf match.
    pub fn params(&self) -> Params {
        self.matches.last().map(|m| m.params.clone()).unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.fatal_error.is_some()
    }
}

/// Where the router is in its transition cycle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationPhase {
    Idle = 0,
    Pending = 1,
    Committing = 2,
}

impl From<u8> for NavigationPhase {
    fn from(val: u8) -> Self {
        match val {
            1 => NavigationPhase::Pending,
            2 => NavigationPhase::Committing,
            _ => NavigationPhase::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trip() {
        for phase in [NavigationPhase::Idle, NavigationPhase::Pending, NavigationPhase::Committing] {
            assert_eq!(NavigationPhase::from(phase as u8), phase);
        }
        assert_eq!(NavigationPhase::from(42), NavigationPhase::Idle);
    }

    #[test]
    fn test_empty_state() {
        let state = MatchedState::empty(Location::initial());
        assert!(!state.initialized);
        assert!(state.matches.is_empty());
        assert!(!state.has_errors());
        assert!(state.params().is_empty());
    }
}

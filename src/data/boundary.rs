//! Error boundary resolution.
//!
//! A failure raised at match `i` is recorded on the nearest route at or
//! above `i` that declares an error boundary. Without one the failure is
//! fatal for the whole tree.

use std::collections::HashMap;

use crate::data::types::RouteFailure;
use crate::routing::RouteMatch;

/// Index of the nearest boundary at or above `from`.
pub fn nearest_boundary(matches: &[RouteMatch], from: usize) -> Option<usize> {
    let upper = from.min(matches.len().checked_sub(1)?);
    (0..=upper).rev().find(|&i| matches[i].route.error_boundary)
}

/// Failures collected during one transition, keyed by boundary route id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failures {
    pub by_boundary: HashMap<String, RouteFailure>,
    pub fatal: Option<RouteFailure>,
}

impl Failures {
    /// Record a failure raised at `matches[from]`. The first failure a
    /// boundary receives is the one it keeps.
    pub fn record(&mut self, matches: &[RouteMatch], from: usize, failure: RouteFailure) {
        match nearest_boundary(matches, from) {
            Some(i) => {
                let boundary = &matches[i].route_id;
                tracing::debug!(route_id = %failure.route_id, boundary = %boundary, "Failure caught by error boundary");
                self.by_boundary.entry(boundary.clone()).or_insert(failure);
            }
            None => {
                tracing::warn!(route_id = %failure.route_id, error = %failure.message, "Failure not caught by any error boundary");
                if self.fatal.is_none() {
                    self.fatal = Some(failure);
                }
            }
        }
    }

    /// Record a failure on a boundary already resolved by the caller.
    pub fn record_on(&mut self, boundary: impl Into<String>, failure: RouteFailure) {
        self.by_boundary.entry(boundary.into()).or_insert(failure);
    }

    /// Record a failure that must go to the tree-wide error state.
    pub fn record_fatal(&mut self, failure: RouteFailure) {
        if self.fatal.is_none() {
            self.fatal = Some(failure);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_boundary.is_empty() && self.fatal.is_none()
    }

    pub fn merge(&mut self, other: Failures) {
        for (boundary, failure) in other.by_boundary {
            self.by_boundary.entry(boundary).or_insert(failure);
        }
        if self.fatal.is_none() {
            self.fatal = other.fatal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::FailureKind;
    use crate::routing::{Location, RouteNode, RouteTree, MatchOptions, match_routes};

    fn matches(root_boundary: bool) -> Vec<RouteMatch> {
        let mut root = RouteNode::new("root").with_path("/");
        if root_boundary {
            root = root.with_error_boundary();
        }
        let tree = RouteTree::build(
            vec![root.with_child(
                RouteNode::new("posts")
                    .with_path("posts")
                    .with_error_boundary()
                    .with_child(RouteNode::new("post").with_path(":id")),
            )],
            MatchOptions::default(),
            16,
        )
        .unwrap();
        match_routes(&tree, &Location::parse("/posts/1")).unwrap().matches
    }

    #[test]
    fn test_nearest_boundary_walks_up() {
        let m = matches(true);
        assert_eq!(nearest_boundary(&m, 2), Some(1));
        assert_eq!(nearest_boundary(&m, 1), Some(1));
        assert_eq!(nearest_boundary(&m, 0), Some(0));
        assert_eq!(nearest_boundary(&[], 0), None);
    }

    #[test]
    fn test_record_first_failure_wins() {
        let m = matches(false);
        let mut failures = Failures::default();
        failures.record(&m, 2, RouteFailure::new(FailureKind::Loader, "post", "first", None));
        failures.record(&m, 1, RouteFailure::new(FailureKind::Loader, "posts", "second", None));
        assert_eq!(failures.by_boundary["posts"].message, "first");

        failures.record(&m, 0, RouteFailure::new(FailureKind::Loader, "root", "uncaught", None));
        assert_eq!(failures.fatal.as_ref().map(|f| f.route_id.as_str()), Some("root"));
    }
}

//! Chain diffing between the committed state and a candidate.

use crate::routing::RouteMatch;

/// How two chains relate, by `(route id, params)` identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionDiff {
    /// Indices into the previous chain, deepest first.
    pub leaving: Vec<usize>,
    /// Indices into the candidate chain, shallowest first.
    pub entering: Vec<usize>,
    /// Indices into the candidate chain present in both.
    pub shared: Vec<usize>,
}

impl TransitionDiff {
    pub fn is_entering(&self, index: usize) -> bool {
        self.entering.contains(&index)
    }

    pub fn is_shared(&self, index: usize) -> bool {
        self.shared.contains(&index)
    }

    /// Nothing enters or leaves.
    pub fn is_empty(&self) -> bool {
        self.leaving.is_empty() && self.entering.is_empty()
    }
}

pub fn diff_matches(previous: &[RouteMatch], next: &[RouteMatch]) -> TransitionDiff {
    let leaving = (0..previous.len())
        .rev()
        .filter(|&i| !next.iter().any(|m| m.same_as(&previous[i])))
        .collect();

    let (shared, entering) = (0..next.len()).partition(|&i| previous.iter().any(|m| m.same_as(&next[i])));

    TransitionDiff {
        leaving,
        entering,
        shared,
    }
}

//! Route flattening and ranking.
//!
//! # Responsibilities
//! - Expand the nested tree into root-to-leaf candidate chains
//! - Score each chain's composite pattern by segment kind
//! - Order chains so the most specific candidate is tried first
//!
//! # Design Decisions
//! - Literal +10, dynamic +2, wildcard -1, summed over the composite pattern
//! - Descendants are emitted before their parent, so on equal score an
//!   index route beats the bare layout at the same path
//! - Stable sort: equal scores keep declaration order among siblings

use std::sync::Arc;

use crate::pattern::CompiledPattern;
use crate::routing::location::join_paths;
use crate::routing::tree::RouteNode;

/// One node of a chain together with its cumulative pattern.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    pub route: Arc<RouteNode>,
    /// Absolute pattern up to and including this node.
    pub pattern: String,
}

/// A depth-first path from a top-level route to a leaf.
#[derive(Debug, Clone)]
pub struct FlattenedChain {
    pub entries: Vec<ChainEntry>,
    /// Composite pattern of the whole chain.
    pub pattern: String,
    pub score: i32,
}

impl FlattenedChain {
    pub fn leaf(&self) -> &ChainEntry {
        // Chains always hold at least the node that produced them.
        &self.entries[self.entries.len() - 1]
    }

    /// Route ids from root to leaf.
    pub fn route_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.route.id.as_str()).collect()
    }
}

/// Score a composite pattern.
pub fn score_pattern(pattern: &str) -> i32 {
    CompiledPattern::compile(pattern, true).score()
}

/// Expand `routes` into chains in declaration order, descendants first.
pub fn flatten(routes: &[Arc<RouteNode>]) -> Vec<FlattenedChain> {
    let mut out = Vec::new();
    let mut parents = Vec::new();
    for route in routes {
        visit(route, &mut parents, "/", true, &mut out);
    }
    out
}

fn visit(
    node: &Arc<RouteNode>,
    parents: &mut Vec<ChainEntry>,
    parent_pattern: &str,
    is_root: bool,
    out: &mut Vec<FlattenedChain>,
) {
    let pattern = join_paths(parent_pattern, node.path.as_deref().unwrap_or(""));
    parents.push(ChainEntry {
        route: node.clone(),
        pattern: pattern.clone(),
    });

    if !node.index {
        for child in &node.children {
            visit(child, parents, &pattern, false, out);
        }
    }

    if node.path.is_some() || node.index || is_root {
        out.push(FlattenedChain {
            entries: parents.clone(),
            score: score_pattern(&pattern),
            pattern,
        });
    }

    parents.pop();
}

/// Sort chains by descending score, keeping the incoming order on ties.
pub fn rank(mut chains: Vec<FlattenedChain>) -> Vec<FlattenedChain> {
    chains.sort_by(|a, b| b.score.cmp(&a.score));
    chains
}

pub fn flatten_and_rank(routes: &[Arc<RouteNode>]) -> Vec<FlattenedChain> {
    rank(flatten(routes))
}

//! Location matching.
//!
//! # Responsibilities
//! - Strip the basename and the query/hash before matching
//! - Walk ranked chains; the first chain whose routes, each matching its
//!   own segments under its own case rules, consume the whole pathname wins
//! - Rebuild per-node boundaries (`pathname`, `pathname_base`) with
//!   prefix matches so nested renderers know what each route consumed
//!
//! # Design Decisions
//! - No match is `None`, never an error
//! - Pure string work: never blocks, never suspends

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::pattern::{SplitPath, WILDCARD_PARAM};
use crate::routing::location::{join_paths, strip_basename, Location, Query};
use crate::routing::tree::{RouteNode, RouteTree};

/// Decoded params by name.
pub type Params = BTreeMap<String, String>;

/// One route bound to concrete params.
#[derive(Debug, Clone, Serialize)]
pub struct RouteMatch {
    pub route_id: String,
    #[serde(skip)]
    pub route: Arc<RouteNode>,
    /// This route's params merged over its ancestors'.
    pub params: Params,
    /// Portion of the pathname matched up to and including this route.
    pub pathname: String,
    /// Portion matched before this route's own segments.
    pub pathname_base: String,
}

impl RouteMatch {
    /// Identity used when comparing chains across transitions.
    pub fn same_as(&self, other: &RouteMatch) -> bool {
        self.route_id == other.route_id && self.params == other.params
    }
}

/// A successful match of a location against a tree.
#[derive(Debug, Clone, Serialize)]
pub struct LocationMatch {
    /// Root to leaf, including pathless ancestors.
    pub matches: Vec<RouteMatch>,
    pub query: Query,
}

impl LocationMatch {
    /// Params of the leaf, i.e. every param in the location.
    pub fn params(&self) -> Params {
        self.matches.last().map(|m| m.params.clone()).unwrap_or_default()
    }

    pub fn route_ids(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.route_id.as_str()).collect()
    }
}

/// Match `location` against `tree`.
pub fn match_routes(tree: &RouteTree, location: &Location) -> Option<LocationMatch> {
    let options = tree.options();
    let pathname = strip_basename(&location.pathname, &options.basename)?;
    let path = SplitPath::new(&pathname);

    'chains: for chain in tree.chains() {
        let last = chain.entries.len() - 1;
        let mut matches = Vec::with_capacity(chain.entries.len());
        let mut params = Params::new();
        let mut parent_pathname = "/".to_string();
        let mut consumed = 0;

        // Each route matches its own segments under its own case rules
        for (i, entry) in chain.entries.iter().enumerate() {
            let own = tree
                .compiler()
                .compile(entry.route.path.as_deref().unwrap_or(""), tree.is_case_sensitive(&entry.route));
            let Some(found) = own.match_from(&path, consumed, i == last) else {
                continue 'chains;
            };

            consumed = found.consumed;
            params.extend(found.params);
            matches.push(RouteMatch {
                route_id: entry.route.id.clone(),
                route: entry.route.clone(),
                params: params.clone(),
                pathname: join_paths(&options.basename, &found.pathname),
                pathname_base: join_paths(&options.basename, &parent_pathname),
            });
            parent_pathname = found.pathname;
        }

        if options.strict && !rest_is_splat(&matches) {
            let composite = tree.compiler().compile(&chain.pattern, true);
            if path.has_trailing_slash() != composite.has_trailing_slash() {
                continue;
            }
        }

        tracing::trace!(pathname = %location.pathname, pattern = %chain.pattern, "Location matched");
        return Some(LocationMatch {
            matches,
            query: location.query(),
        });
    }

    tracing::debug!(pathname = %location.pathname, "No route matched");
    None
}

fn rest_is_splat(matches: &[RouteMatch]) -> bool {
    matches.iter().any(|m| m.params.contains_key(WILDCARD_PARAM))
}

//! Route definitions, the route tree and its explicit index.
//!
//! # Responsibilities
//! - Describe routes as plain data with optional function fields
//! - Validate the tree (unique ids, index routes are leaves)
//! - Build the ranked chain list and the id index once per tree
//! - Produce patched copies for lazily registered routes

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use crate::data::{ActionArgs, DataResult, LoaderArgs, RevalidationArgs};
use crate::navigation::hooks::{HookArgs, HookOutcome};
use crate::pattern::PatternCompiler;
use crate::routing::flatten::{flatten_and_rank, FlattenedChain};
use crate::routing::location::join_paths;

/// Data-producing function of a route.
pub type Loader = Arc<dyn Fn(LoaderArgs) -> BoxFuture<'static, DataResult<Value>> + Send + Sync>;

/// Mutation function of a route.
pub type Action = Arc<dyn Fn(ActionArgs) -> BoxFuture<'static, DataResult<Value>> + Send + Sync>;

/// Will-enter / will-leave hook.
pub type Hook = Arc<dyn Fn(HookArgs) -> BoxFuture<'static, DataResult<HookOutcome>> + Send + Sync>;

/// Decides whether a shared route re-runs its loader.
pub type RevalidatePolicy = Arc<dyn Fn(&RevalidationArgs) -> bool + Send + Sync>;

/// A node of the route tree.
///
/// Capabilities are optional fields invoked uniformly by the router; a route
/// never needs to implement anything.
#[derive(Clone, Default)]
pub struct RouteNode {
    /// Unique across the tree.
    pub id: String,
    /// Relative pattern; `None` makes the route pathless.
    pub path: Option<String>,
    /// Index routes render at their parent's path and have no children.
    pub index: bool,
    /// Overrides the router-wide case sensitivity.
    pub case_sensitive: Option<bool>,
    /// Catches errors raised by this route and its descendants.
    pub error_boundary: bool,
    pub children: Vec<Arc<RouteNode>>,
    pub loader: Option<Loader>,
    pub action: Option<Action>,
    pub should_revalidate: Option<RevalidatePolicy>,
    pub will_enter: Option<Hook>,
    pub will_leave: Option<Hook>,
}

impl RouteNode {
    /// A pathless route; add a path with [`RouteNode::with_path`].
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// An index route.
    pub fn new_index(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: true,
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    pub fn with_error_boundary(mut self) -> Self {
        self.error_boundary = true;
        self
    }

    pub fn with_child(mut self, child: RouteNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = RouteNode>) -> Self {
        self.children.extend(children.into_iter().map(Arc::new));
        self
    }

    pub fn with_loader<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(LoaderArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DataResult<Value>> + Send + 'static,
    {
        let loader: Loader = Arc::new(move |args| f(args).boxed());
        self.loader = Some(loader);
        self
    }

    pub fn with_action<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ActionArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DataResult<Value>> + Send + 'static,
    {
        let action: Action = Arc::new(move |args| f(args).boxed());
        self.action = Some(action);
        self
    }

    pub fn with_should_revalidate<F>(mut self, f: F) -> Self
    where
        F: Fn(&RevalidationArgs) -> bool + Send + Sync + 'static,
    {
        self.should_revalidate = Some(Arc::new(f));
        self
    }

    pub fn with_will_enter<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DataResult<HookOutcome>> + Send + 'static,
    {
        let hook: Hook = Arc::new(move |args| f(args).boxed());
        self.will_enter = Some(hook);
        self
    }

    pub fn with_will_leave<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DataResult<HookOutcome>> + Send + 'static,
    {
        let hook: Hook = Arc::new(move |args| f(args).boxed());
        self.will_leave = Some(hook);
        self
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("index", &self.index)
            .field("case_sensitive", &self.case_sensitive)
            .field("error_boundary", &self.error_boundary)
            .field("children", &self.children)
            .field("loader", &self.loader.is_some())
            .field("action", &self.action.is_some())
            .field("should_revalidate", &self.should_revalidate.is_some())
            .field("will_enter", &self.will_enter.is_some())
            .field("will_leave", &self.will_leave.is_some())
            .finish()
    }
}

/// Errors detected while building or patching a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("route id must not be empty")]
    EmptyId,

    #[error("duplicate route id `{0}`")]
    DuplicateId(String),

    #[error("index route `{0}` cannot have children")]
    IndexWithChildren(String),

    #[error("cannot patch unknown route `{0}`")]
    UnknownParent(String),

    #[error("cannot add children to index route `{0}`")]
    PatchIndexRoute(String),
}

pub type TreeResult<T> = Result<T, TreeError>;

/// Tree-wide matching options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    /// Prefix the tree is mounted under.
    pub basename: String,
    /// Default for routes that do not declare `case_sensitive`.
    pub case_sensitive: bool,
    /// Make the trailing slash significant.
    pub strict: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            basename: "/".to_string(),
            case_sensitive: false,
            strict: false,
        }
    }
}

/// One entry of the route index.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub node: Arc<RouteNode>,
    pub parent: Option<String>,
    /// Absolute composite pattern of this route.
    pub pattern: String,
    pub depth: usize,
}

/// Explicit id → route lookup, built once per tree.
#[derive(Debug, Clone, Default)]
pub struct RouteIndex {
    entries: HashMap<String, IndexEntry>,
}

impl RouteIndex {
    fn build(routes: &[Arc<RouteNode>]) -> TreeResult<Self> {
        let mut index = Self::default();
        for route in routes {
            index.insert(route, None, "/", 0)?;
        }
        Ok(index)
    }

    fn insert(&mut self, node: &Arc<RouteNode>, parent: Option<&str>, parent_pattern: &str, depth: usize) -> TreeResult<()> {
        if node.id.is_empty() {
            return Err(TreeError::EmptyId);
        }
        if node.index && !node.children.is_empty() {
            return Err(TreeError::IndexWithChildren(node.id.clone()));
        }
        if self.entries.contains_key(&node.id) {
            return Err(TreeError::DuplicateId(node.id.clone()));
        }

        let pattern = join_paths(parent_pattern, node.path.as_deref().unwrap_or(""));
        self.entries.insert(
            node.id.clone(),
            IndexEntry {
                node: node.clone(),
                parent: parent.map(str::to_string),
                pattern: pattern.clone(),
                depth,
            },
        );

        for child in &node.children {
            self.insert(child, Some(&node.id), &pattern, depth + 1)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn route(&self, id: &str) -> Option<&Arc<RouteNode>> {
        self.entries.get(id).map(|e| &e.node)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An immutable route tree with everything needed for matching.
#[derive(Debug)]
pub struct RouteTree {
    routes: Vec<Arc<RouteNode>>,
    chains: Vec<FlattenedChain>,
    index: RouteIndex,
    compiler: PatternCompiler,
    options: MatchOptions,
}

impl RouteTree {
    /// Validate `routes` and precompute ranked chains and the index.
    pub fn build(routes: Vec<RouteNode>, options: MatchOptions, cache_capacity: usize) -> TreeResult<Self> {
        Self::from_arcs(routes.into_iter().map(Arc::new).collect(), options, cache_capacity)
    }

    fn from_arcs(routes: Vec<Arc<RouteNode>>, options: MatchOptions, cache_capacity: usize) -> TreeResult<Self> {
        let index = RouteIndex::build(&routes)?;
        let chains = flatten_and_rank(&routes);
        let compiler = PatternCompiler::new(cache_capacity);

        tracing::debug!(routes = index.len(), chains = chains.len(), "Route tree built");

        Ok(Self {
            routes,
            chains,
            index,
            compiler,
            options,
        })
    }

    /// A new tree with `children` appended under `parent` (or at the top level).
    pub fn patched(&self, parent: Option<&str>, children: Vec<RouteNode>) -> TreeResult<Self> {
        let mut routes = self.routes.clone();
        let children: Vec<Arc<RouteNode>> = children.into_iter().map(Arc::new).collect();

        match parent {
            None => routes.extend(children),
            Some(parent_id) => {
                let target = self
                    .index
                    .route(parent_id)
                    .ok_or_else(|| TreeError::UnknownParent(parent_id.to_string()))?;
                if target.index {
                    return Err(TreeError::PatchIndexRoute(parent_id.to_string()));
                }
                append_children(&mut routes, parent_id, children);
            }
        }

        Self::from_arcs(routes, self.options.clone(), self.compiler.capacity())
    }

    pub fn routes(&self) -> &[Arc<RouteNode>] {
        &self.routes
    }

    /// Chains in rank order.
    pub fn chains(&self) -> &[FlattenedChain] {
        &self.chains
    }

    pub fn index(&self) -> &RouteIndex {
        &self.index
    }

    pub fn compiler(&self) -> &PatternCompiler {
        &self.compiler
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Effective case sensitivity of a route.
    pub fn is_case_sensitive(&self, route: &RouteNode) -> bool {
        route.case_sensitive.unwrap_or(self.options.case_sensitive)
    }
}

fn append_children(routes: &mut [Arc<RouteNode>], parent_id: &str, children: Vec<Arc<RouteNode>>) -> bool {
    for route in routes.iter_mut() {
        if route.id == parent_id {
            Arc::make_mut(route).children.extend(children);
            return true;
        }
        if contains_id(route.as_ref(), parent_id) {
            return append_children(&mut Arc::make_mut(route).children, parent_id, children);
        }
    }
    false
}

fn contains_id(node: &RouteNode, id: &str) -> bool {
    node.children.iter().any(|c| c.id == id || contains_id(c, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(routes: Vec<RouteNode>) -> TreeResult<RouteTree> {
        RouteTree::build(routes, MatchOptions::default(), 100)
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = tree(vec![RouteNode::new("root")
            .with_path("/")
            .with_children([RouteNode::new("a").with_path("a"), RouteNode::new("a").with_path("b")])])
        .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId("a".into()));
    }

    #[test]
    fn test_index_with_children_rejected() {
        let err = tree(vec![RouteNode::new_index("idx").with_child(RouteNode::new("c").with_path("c"))]).unwrap_err();
        assert_eq!(err, TreeError::IndexWithChildren("idx".into()));
    }

    #[test]
    fn test_index_entries() {
        let t = tree(vec![RouteNode::new("root").with_path("/").with_child(
            RouteNode::new("posts")
                .with_path("posts")
                .with_child(RouteNode::new("post").with_path(":id")),
        )])
        .unwrap();

        let entry = t.index().get("post").unwrap();
        assert_eq!(entry.pattern, "/posts/:id");
        assert_eq!(entry.parent.as_deref(), Some("posts"));
        assert_eq!(entry.depth, 2);
        assert!(t.index().get("nope").is_none());
    }

    #[test]
    fn test_patch_adds_children() {
        let t = tree(vec![RouteNode::new("root")
            .with_path("/")
            .with_child(RouteNode::new("admin").with_path("admin"))])
        .unwrap();

        let patched = t
            .patched(Some("admin"), vec![RouteNode::new("users").with_path("users")])
            .unwrap();
        assert_eq!(patched.index().get("users").unwrap().pattern, "/admin/users");
        // Original tree is untouched
        assert!(!t.index().contains("users"));

        let err = t.patched(Some("ghost"), vec![]).unwrap_err();
        assert_eq!(err, TreeError::UnknownParent("ghost".into()));
    }

    #[test]
    fn test_debug_hides_functions() {
        let node = RouteNode::new("r").with_loader(|_| async { Ok(Value::Null) });
        let debug = format!("{:?}", node);
        assert!(debug.contains("loader: true"));
    }
}

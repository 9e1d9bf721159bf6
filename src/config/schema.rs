//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::pattern::DEFAULT_CACHE_CAPACITY;
use crate::routing::{MatchOptions, RouteNode};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Matching and navigation behaviour.
    pub router: RouterConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Declarative route table.
    pub routes: Vec<RouteConfig>,
}

impl AppConfig {
    /// Route nodes for the configured table. They carry no functions.
    pub fn route_nodes(&self) -> Vec<RouteNode> {
        self.routes.iter().map(RouteConfig::to_node).collect()
    }
}

/// Router settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prefix the whole tree is mounted under.
    pub basename: String,

    /// Default case sensitivity for routes that do not set their own.
    pub case_sensitive: bool,

    /// Require trailing slashes to match exactly.
    pub strict_trailing_slash: bool,

    /// Maximum compiled patterns cached per route tree.
    pub pattern_cache_capacity: usize,

    /// Redirects a single navigation may follow.
    pub max_redirects: usize,

    /// Buffered transition events per subscriber.
    pub event_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            basename: "/".to_string(),
            case_sensitive: false,
            strict_trailing_slash: false,
            pattern_cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_redirects: 10,
            event_capacity: 64,
        }
    }
}

impl RouterConfig {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            basename: self.basename.clone(),
            case_sensitive: self.case_sensitive,
            strict: self.strict_trailing_slash,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// One route in the declarative table.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouteConfig {
    pub id: String,

    /// Pattern relative to the parent. Omit for a layout route.
    pub path: Option<String>,

    /// Matches the parent's path exactly; cannot have children.
    pub index: bool,

    /// Overrides `router.case_sensitive`.
    pub case_sensitive: Option<bool>,

    pub error_boundary: bool,

    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    pub fn to_node(&self) -> RouteNode {
        let mut node = if self.index {
            RouteNode::new_index(self.id.clone())
        } else {
            RouteNode::new(self.id.clone())
        };
        if let Some(path) = &self.path {
            node = node.with_path(path.clone());
        }
        if let Some(case_sensitive) = self.case_sensitive {
            node = node.with_case_sensitive(case_sensitive);
        }
        if self.error_boundary {
            node = node.with_error_boundary();
        }
        node.with_children(self.children.iter().map(RouteConfig::to_node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.router.basename, "/");
        assert_eq!(config.router.max_redirects, 10);
        assert_eq!(config.router.pattern_cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_nested_routes() {
        let config: AppConfig = toml::from_str(
            r#"
            [router]
            basename = "/app"

            [[routes]]
            id = "root"
            path = "/"
            error_boundary = true

            [[routes.children]]
            id = "posts"
            path = "posts"

            [[routes.children.children]]
            id = "posts-index"
            index = true
            "#,
        )
        .unwrap();

        assert_eq!(config.router.basename, "/app");
        let nodes = config.route_nodes();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].error_boundary);
        let posts = &nodes[0].children[0];
        assert_eq!(posts.path.as_deref(), Some("posts"));
        assert!(posts.children[0].index);
    }
}

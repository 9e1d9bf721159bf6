//! Locations, query strings and basename handling.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Key given to the location a router starts from.
pub const INITIAL_KEY: &str = "default";

/// A concrete place in the application: `(pathname, search, hash, state, key)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Always starts with `/`.
    pub pathname: String,
    /// Empty or starting with `?`.
    pub search: String,
    /// Empty or starting with `#`.
    pub hash: String,
    /// Opaque state attached by the history collaborator.
    pub state: Option<Value>,
    /// Unique per history entry.
    pub key: String,
}

impl Location {
    /// Parse an href such as `/posts/1?tab=2#top`, assigning a fresh key.
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = match href.find('#') {
            Some(i) => (&href[..i], &href[i..]),
            None => (href, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };

        Self {
            pathname: normalize_pathname(pathname),
            search: if search == "?" { String::new() } else { search.to_string() },
            hash: if hash == "#" { String::new() } else { hash.to_string() },
            state: None,
            key: create_key(),
        }
    }

    /// The location a fresh router reports before its first navigation.
    pub fn initial() -> Self {
        Self {
            key: INITIAL_KEY.to_string(),
            ..Self::parse("/")
        }
    }

    pub fn with_state(mut self, state: Option<Value>) -> Self {
        self.state = state;
        self
    }

    /// Parsed query parameters.
    pub fn query(&self) -> Query {
        Query::parse(&self.search)
    }

    /// Reassemble `pathname + search + hash`.
    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }

    /// Same document target: pathname and search equal, hash ignored.
    pub fn same_target(&self, other: &Location) -> bool {
        self.pathname == other.pathname && self.search == other.search
    }
}

/// Generate a short random key for a history entry.
pub fn create_key() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn normalize_pathname(pathname: &str) -> String {
    if pathname.is_empty() {
        "/".to_string()
    } else if pathname.starts_with('/') {
        pathname.to_string()
    } else {
        format!("/{}", pathname)
    }
}

/// Decoded query string, preserving order and repeated keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// Parse `?a=1&b=2` (leading `?` optional).
    pub fn parse(search: &str) -> Self {
        let raw = search.strip_prefix('?').unwrap_or(search);
        Self(
            url::form_urlencoded::parse(raw.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Strip `basename` from `pathname`.
///
/// Returns `None` when the path lives outside the base. Comparison is
/// case-insensitive and only happens on segment boundaries.
pub fn strip_basename(pathname: &str, basename: &str) -> Option<String> {
    let base = basename.trim_end_matches('/');
    if base.is_empty() {
        return Some(pathname.to_string());
    }

    let head = pathname.get(..base.len())?;
    if !head.eq_ignore_ascii_case(base) {
        return None;
    }

    let rest = &pathname[base.len()..];
    if rest.is_empty() {
        Some("/".to_string())
    } else if rest.starts_with('/') {
        Some(rest.to_string())
    } else {
        None
    }
}

/// Join two path fragments with exactly one `/` between them.
pub fn join_paths(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    let child = child.trim_start_matches('/');
    match (parent.is_empty(), child.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => parent.to_string(),
        (true, false) => format!("/{}", child),
        (false, false) => format!("{}/{}", parent, child),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_href() {
        let loc = Location::parse("/posts/1?tab=comments&x=1#top");
        assert_eq!(loc.pathname, "/posts/1");
        assert_eq!(loc.search, "?tab=comments&x=1");
        assert_eq!(loc.hash, "#top");
        assert_eq!(loc.key.len(), 8);
        assert_eq!(loc.href(), "/posts/1?tab=comments&x=1#top");

        let bare = Location::parse("posts?");
        assert_eq!(bare.pathname, "/posts");
        assert_eq!(bare.search, "");
    }

    #[test]
    fn test_keys_are_unique() {
        assert_ne!(Location::parse("/").key, Location::parse("/").key);
        assert_eq!(Location::initial().key, INITIAL_KEY);
    }

    #[test]
    fn test_query_parsing() {
        let query = Query::parse("?q=rust+router&tag=a&tag=b&enc=%2F");
        assert_eq!(query.get("q"), Some("rust router"));
        assert_eq!(query.get_all("tag"), vec!["a", "b"]);
        assert_eq!(query.get("enc"), Some("/"));
        assert_eq!(query.get("missing"), None);
        assert!(Query::parse("").is_empty());
    }

    #[test]
    fn test_strip_basename() {
        assert_eq!(strip_basename("/app/posts", "/app").as_deref(), Some("/posts"));
        assert_eq!(strip_basename("/APP/posts", "/app").as_deref(), Some("/posts"));
        assert_eq!(strip_basename("/app", "/app/").as_deref(), Some("/"));
        assert_eq!(strip_basename("/application", "/app"), None);
        assert_eq!(strip_basename("/other", "/app"), None);
        assert_eq!(strip_basename("/x", "/").as_deref(), Some("/x"));
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/", "posts"), "/posts");
        assert_eq!(join_paths("/posts", ":id"), "/posts/:id");
        assert_eq!(join_paths("/posts/", "/new"), "/posts/new");
        assert_eq!(join_paths("/posts", ""), "/posts");
        assert_eq!(join_paths("", ""), "/");
    }
}

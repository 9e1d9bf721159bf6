//! Route pattern compilation and path matching.
//!
//! # Responsibilities
//! - Split a pattern into literal, dynamic (`:name`) and wildcard (`*`) segments
//! - Match a split path against the segments, extracting decoded params
//! - Honour per-route case sensitivity and the strict trailing-slash mode
//!
//! # Design Decisions
//! - Segment comparison instead of regex: matching is O(segments)
//! - Compilation never fails; malformed pieces degrade to literals
//! - Path segments are percent-decoded before literal comparison

/// One piece of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the decoded path segment.
    Literal(String),
    /// Captures one non-empty path segment under the given name.
    Dynamic(String),
    /// Captures the rest of the path under `*`.
    Wildcard,
}

impl Segment {
    /// Ranking weight of this segment.
    pub fn score(&self) -> i32 {
        match self {
            Segment::Literal(_) => 10,
            Segment::Dynamic(_) => 2,
            Segment::Wildcard => -1,
        }
    }
}

/// Synthetic parameter name for the trailing wildcard.
pub const WILDCARD_PARAM: &str = "*";

/// Characters a dynamic segment may not contain.
const DYNAMIC_EXCLUDED: [char; 4] = ['/', '.', '?', '#'];

/// A request path split into raw segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath {
    segments: Vec<String>,
    trailing_slash: bool,
}

impl SplitPath {
    /// Split a pathname (without query or hash).
    ///
    /// Interior empty segments (`/a//b`) are kept so that they never match.
    pub fn new(pathname: &str) -> Self {
        let trimmed = pathname.strip_prefix('/').unwrap_or(pathname);
        let trailing_slash = !trimmed.is_empty() && trimmed.ends_with('/');
        let body = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let segments = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/').map(str::to_string).collect()
        };

        Self {
            segments,
            trailing_slash,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    fn prefix(&self, consumed: usize) -> String {
        format!("/{}", self.segments[..consumed].join("/"))
    }
}

/// Result of matching a compiled pattern against a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// Decoded params in pattern order.
    pub params: Vec<(String, String)>,
    /// The raw matched prefix of the path.
    pub pathname: String,
    /// Number of path segments consumed.
    pub consumed: usize,
}

/// A compiled pattern: the matcher plus its ordered param names.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
    case_sensitive: bool,
    trailing_slash: bool,
}

impl CompiledPattern {
    /// Compile a pattern string.
    pub fn compile(pattern: &str, case_sensitive: bool) -> Self {
        let source = pattern.trim();
        let body = source.strip_prefix('/').unwrap_or(source);
        let trailing_slash = !body.is_empty() && body.ends_with('/');

        let raw: Vec<&str> = body.split('/').filter(|s| !s.is_empty()).collect();
        let last = raw.len().saturating_sub(1);

        let mut segments = Vec::with_capacity(raw.len());
        let mut param_names = Vec::new();

        for (i, piece) in raw.iter().enumerate() {
            let segment = match *piece {
                "*" if i == last => {
                    param_names.push(WILDCARD_PARAM.to_string());
                    Segment::Wildcard
                }
                "*" => {
                    tracing::warn!(pattern = %source, "Wildcard is only allowed as the last segment; treating it as a literal");
                    Segment::Literal(normalize_literal("*", case_sensitive))
                }
                p if p.starts_with(':') => match p[1..].to_string() {
                    name if is_param_name(&name) => {
                        param_names.push(name.clone());
                        Segment::Dynamic(name)
                    }
                    _ => {
                        tracing::warn!(pattern = %source, segment = %p, "Invalid parameter name; treating segment as a literal");
                        Segment::Literal(normalize_literal(p, case_sensitive))
                    }
                },
                p => Segment::Literal(normalize_literal(p, case_sensitive)),
            };
            segments.push(segment);
        }

        Self {
            source: source.to_string(),
            segments,
            param_names,
            case_sensitive,
            trailing_slash,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Ordered parameter names, `*` last when present.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Sum of segment weights.
    pub fn score(&self) -> i32 {
        self.segments.iter().map(Segment::score).sum()
    }

    /// Whether the pattern itself ends with `/`.
    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Match the pattern against a split path.
    ///
    /// With `end` the whole path must be consumed; otherwise the pattern only
    /// has to match a prefix. `strict` makes the trailing slash significant
    /// and only applies to end-anchored matches.
    pub fn match_path(&self, path: &SplitPath, end: bool, strict: bool) -> Option<PathMatch> {
        let found = self.match_from(path, 0, end)?;
        if end && strict && !self.has_wildcard() && path.has_trailing_slash() != self.trailing_slash {
            return None;
        }
        Some(found)
    }

    /// Match the pattern against the path segments that follow the first
    /// `start`, which an ancestor already consumed.
    ///
    /// `params` holds only this pattern's captures; `pathname` and
    /// `consumed` are absolute. Trailing slashes are not checked here.
    pub fn match_from(&self, path: &SplitPath, start: usize, end: bool) -> Option<PathMatch> {
        let input = path.segments();
        let mut params = Vec::with_capacity(self.param_names.len());
        let mut consumed = start.min(input.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(expected) => {
                    let raw = input.get(consumed)?;
                    let decoded = decode_segment(raw);
                    let equal = if self.case_sensitive {
                        decoded == *expected
                    } else {
                        decoded.to_lowercase() == *expected
                    };
                    if !equal {
                        return None;
                    }
                    consumed += 1;
                }
                Segment::Dynamic(name) => {
                    let raw = input.get(consumed)?;
                    if raw.is_empty() || raw.contains(DYNAMIC_EXCLUDED) {
                        return None;
                    }
                    params.push((name.clone(), decode_segment(raw)));
                    consumed += 1;
                }
                Segment::Wildcard => {
                    let rest: Vec<String> = input[consumed..]
                        .iter()
                        .map(|raw| decode_segment(raw))
                        .collect();
                    params.push((WILDCARD_PARAM.to_string(), rest.join("/")));
                    let pathname = path.prefix(consumed);
                    return Some(PathMatch {
                        params,
                        pathname,
                        consumed: input.len(),
                    });
                }
            }
        }

        if end && consumed != input.len() {
            return None;
        }

        Some(PathMatch {
            params,
            pathname: path.prefix(consumed),
            consumed,
        })
    }
}

/// Percent-decode one path segment, falling back to the raw text.
pub fn decode_segment(raw: &str) -> String {
    if !raw.contains('%') {
        return raw.to_string();
    }
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::warn!(segment = %raw, error = %e, "Path segment is not valid percent-encoded UTF-8; using raw value");
            raw.to_string()
        }
    }
}

fn normalize_literal(literal: &str, case_sensitive: bool) -> String {
    let decoded = decode_segment(literal);
    if case_sensitive {
        decoded
    } else {
        decoded.to_lowercase()
    }
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, path: &str) -> Option<PathMatch> {
        CompiledPattern::compile(pattern, false).match_path(&SplitPath::new(path), true, false)
    }

    #[test]
    fn test_compile_param_names() {
        let compiled = CompiledPattern::compile("/users/:id/files/*", false);
        assert_eq!(compiled.param_names(), &["id".to_string(), "*".to_string()]);
        assert!(compiled.has_wildcard());
        assert_eq!(compiled.score(), 10 + 2 + 10 - 1);
    }

    #[test]
    fn test_literal_match_is_case_insensitive_by_default() {
        assert!(matches("/About", "/about").is_some());
        assert!(matches("/about", "/ABOUT").is_some());

        let strict_case = CompiledPattern::compile("/About", true);
        assert!(strict_case.match_path(&SplitPath::new("/about"), true, false).is_none());
        assert!(strict_case.match_path(&SplitPath::new("/About"), true, false).is_some());
    }

    #[test]
    fn test_dynamic_segment_excludes_dots() {
        let m = matches("/posts/:id", "/posts/42").unwrap();
        assert_eq!(m.params, vec![("id".to_string(), "42".to_string())]);

        assert!(matches("/posts/:id", "/posts/file.txt").is_none());
        assert!(matches("/posts/:id", "/posts/").is_none());
        assert!(matches("/posts/:id", "/posts/1/2").is_none());
    }

    #[test]
    fn test_percent_decoding() {
        let m = matches("/tags/:tag", "/tags/caf%C3%A9").unwrap();
        assert_eq!(m.params[0].1, "café");

        assert!(matches("/caf%C3%A9", "/café").is_some());
        assert!(matches("/hello world", "/hello%20world").is_some());
    }

    #[test]
    fn test_invalid_escape_keeps_raw_value() {
        let m = matches("/files/:name", "/files/%FF").unwrap();
        assert_eq!(m.params[0].1, "%FF");
    }

    #[test]
    fn test_wildcard_captures_rest() {
        let m = matches("/docs/*", "/docs/guide/intro").unwrap();
        assert_eq!(m.params, vec![("*".to_string(), "guide/intro".to_string())]);
        assert_eq!(m.pathname, "/docs");

        let empty = matches("/docs/*", "/docs").unwrap();
        assert_eq!(empty.params[0].1, "");
    }

    #[test]
    fn test_trailing_slash_policy() {
        assert!(matches("/a", "/a/").is_some());
        assert!(matches("/a", "/a").is_some());

        let compiled = CompiledPattern::compile("/a", false);
        assert!(compiled.match_path(&SplitPath::new("/a/"), true, true).is_none());
        assert!(compiled.match_path(&SplitPath::new("/a"), true, true).is_some());
    }

    #[test]
    fn test_match_from_offset() {
        let path = SplitPath::new("/DOCS/Intro");
        let child = CompiledPattern::compile("Intro", true);
        let m = child.match_from(&path, 1, true).unwrap();
        assert_eq!(m.pathname, "/DOCS/Intro");
        assert_eq!(m.consumed, 2);
        assert!(m.params.is_empty());
        assert!(child.match_from(&SplitPath::new("/docs/intro"), 1, true).is_none());
        assert!(child.match_from(&path, 0, true).is_none());
    }

    #[test]
    fn test_prefix_match() {
        let compiled = CompiledPattern::compile("/posts", false);
        let m = compiled.match_path(&SplitPath::new("/posts/42"), false, false).unwrap();
        assert_eq!(m.pathname, "/posts");
        assert_eq!(m.consumed, 1);
    }

    #[test]
    fn test_malformed_patterns_never_fail() {
        let compiled = CompiledPattern::compile("/a/*/b", false);
        assert!(compiled.param_names().is_empty());
        assert!(compiled.match_path(&SplitPath::new("/a/*/b"), true, false).is_some());

        let bare_colon = CompiledPattern::compile("/:", false);
        assert_eq!(bare_colon.segments(), &[Segment::Literal(":".to_string())]);
    }

    #[test]
    fn test_double_slash_never_matches_literal() {
        assert!(matches("/a/b", "/a//b").is_none());
    }

    #[test]
    fn test_root_pattern() {
        assert!(matches("/", "/").is_some());
        assert!(matches("", "/").is_some());
        assert!(matches("/", "/x").is_none());
    }
}

//! Building concrete paths from patterns.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::pattern::compiler::{CompiledPattern, Segment, WILDCARD_PARAM};

/// Errors raised while substituting params into a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A dynamic segment had no value.
    #[error("missing value for param `{name}` in pattern `{pattern}`")]
    MissingParam { name: String, pattern: String },

    /// Dynamic segments must be non-empty.
    #[error("empty value for param `{name}` in pattern `{pattern}`")]
    EmptyParam { name: String, pattern: String },
}

/// Substitute `params` into `pattern`.
///
/// Dynamic values are percent-encoded (including `.`) so the generated path
/// matches the same pattern and decodes back to the given values. The splat
/// keeps its `/` separators; a missing splat is treated as empty.
pub fn generate_path(pattern: &str, params: &BTreeMap<String, String>) -> Result<String, PatternError> {
    let compiled = CompiledPattern::compile(pattern, true);
    let mut parts = Vec::with_capacity(compiled.segments().len());

    for segment in compiled.segments() {
        match segment {
            Segment::Literal(literal) => parts.push(literal.clone()),
            Segment::Dynamic(name) => {
                let value = params.get(name).ok_or_else(|| PatternError::MissingParam {
                    name: name.clone(),
                    pattern: pattern.to_string(),
                })?;
                if value.is_empty() {
                    return Err(PatternError::EmptyParam {
                        name: name.clone(),
                        pattern: pattern.to_string(),
                    });
                }
                parts.push(encode_segment(value));
            }
            Segment::Wildcard => {
                if let Some(splat) = params.get(WILDCARD_PARAM).filter(|s| !s.is_empty()) {
                    parts.extend(splat.split('/').map(encode_segment));
                }
            }
        }
    }

    Ok(format!("/{}", parts.join("/")))
}

fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).replace('.', "%2E")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compiler::SplitPath;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_generate_simple() {
        let path = generate_path("/users/:id", &params(&[("id", "42")])).unwrap();
        assert_eq!(path, "/users/42");
        assert_eq!(generate_path("/", &params(&[])).unwrap(), "/");
    }

    #[test]
    fn test_generate_splat() {
        let path = generate_path("/docs/*", &params(&[("*", "guide/intro")])).unwrap();
        assert_eq!(path, "/docs/guide/intro");
        assert_eq!(generate_path("/docs/*", &params(&[])).unwrap(), "/docs");
    }

    #[test]
    fn test_missing_param() {
        let err = generate_path("/users/:id", &params(&[])).unwrap_err();
        assert_eq!(
            err,
            PatternError::MissingParam {
                name: "id".into(),
                pattern: "/users/:id".into()
            }
        );
    }

    #[test]
    fn test_round_trip_with_awkward_values() {
        let pattern = "/files/:dir/:name";
        let compiled = CompiledPattern::compile(pattern, false);

        for (dir, name) in [("a b", "report.pdf"), ("50%", "q?x#y"), ("ünï", "~tilde")] {
            let values = params(&[("dir", dir), ("name", name)]);
            let path = generate_path(pattern, &values).unwrap();
            let m = compiled
                .match_path(&SplitPath::new(&path), true, false)
                .unwrap_or_else(|| panic!("{path} did not match"));
            let extracted: BTreeMap<String, String> = m.params.into_iter().collect();
            assert_eq!(extracted, values);
        }
    }
}

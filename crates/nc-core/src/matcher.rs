//! Parameter Matchers
//!
//! A `removeparam=` value is either a literal parameter name or a
//! `/regex/` (optionally `/regex/i`) tested against `name=value`.

use regex::{Regex, RegexBuilder};

/// Error compiling a `removeparam` value.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Empty removeparam value")]
    Empty,
    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Decides whether a single query parameter matches a rule.
#[derive(Debug, Clone)]
pub enum ParamMatcher {
    /// Parameter name equality, ignoring ASCII and Unicode case.
    Exact(String),
    /// Unanchored search over the `name=value` probe.
    Regex { pattern: Regex, case_insensitive: bool },
}

impl ParamMatcher {
    /// Compile a raw `removeparam=` value.
    pub fn compile(value: &str) -> Result<Self, MatcherError> {
        if value.is_empty() {
            return Err(MatcherError::Empty);
        }

        let Some(body) = value.strip_prefix('/') else {
            return Ok(Self::Exact(value.to_string()));
        };

        let (source, case_insensitive) = if let Some(rest) = body.strip_suffix("/i") {
            (rest, true)
        } else if let Some(rest) = body.strip_suffix('/') {
            (rest, false)
        } else {
            (body, false)
        };

        // An empty pattern would match every parameter.
        if source.is_empty() {
            return Err(MatcherError::Empty);
        }

        let pattern = RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source_err| MatcherError::InvalidRegex {
                pattern: source.to_string(),
                source: source_err,
            })?;

        Ok(Self::Regex {
            pattern,
            case_insensitive,
        })
    }

    /// Test a parameter. `value` is `None` when the query item had no `=`.
    pub fn matches(&self, name: &str, value: Option<&str>) -> bool {
        match self {
            Self::Exact(expected) => eq_ignore_case(name, expected),
            Self::Regex { pattern, .. } => match value {
                Some(value) => {
                    let mut probe = String::with_capacity(name.len() + value.len() + 1);
                    probe.push_str(name);
                    probe.push('=');
                    probe.push_str(value);
                    pattern.is_match(&probe)
                }
                None => pattern.is_match(name),
            },
        }
    }

    /// The value this matcher was compiled from, without the regex delimiters.
    pub fn source(&self) -> &str {
        match self {
            Self::Exact(name) => name,
            Self::Regex { pattern, .. } => pattern.as_str(),
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex { .. })
    }
}

impl PartialEq for ParamMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (
                Self::Regex {
                    pattern: a,
                    case_insensitive: ai,
                },
                Self::Regex {
                    pattern: b,
                    case_insensitive: bi,
                },
            ) => a.as_str() == b.as_str() && ai == bi,
            _ => false,
        }
    }
}

impl Eq for ParamMatcher {}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_value_is_exact() {
        let matcher = ParamMatcher::compile("fbclid").unwrap();
        assert_eq!(matcher, ParamMatcher::Exact("fbclid".to_string()));
        assert!(matcher.matches("fbclid", Some("1")));
        assert!(matcher.matches("FBCLID", None));
        assert!(!matcher.matches("fbclid2", Some("1")));
    }

    #[test]
    fn regex_probes_name_and_value() {
        let matcher = ParamMatcher::compile("/^utm_/").unwrap();
        assert!(matcher.is_regex());
        assert!(matcher.matches("utm_source", Some("anything")));
        assert!(matcher.matches("utm_medium", None));
        assert!(!matcher.matches("x_utm_source", Some("1")));
    }

    #[test]
    fn regex_case_insensitive_flag() {
        let matcher = ParamMatcher::compile("/^from=rss$/i").unwrap();
        assert!(matcher.matches("from", Some("RSS")));
        assert!(!matcher.matches("from", Some("rss2")));

        let sensitive = ParamMatcher::compile("/^from=rss$/").unwrap();
        assert!(!sensitive.matches("from", Some("RSS")));
    }

    #[test]
    fn regex_is_unanchored_search() {
        let matcher = ParamMatcher::compile("/ref=/").unwrap();
        assert!(matcher.matches("xref", Some("abc")));
        assert!(!matcher.matches("ref", None));
    }

    #[test]
    fn regex_without_closing_slash() {
        let matcher = ParamMatcher::compile("/^gclid").unwrap();
        assert_eq!(matcher.source(), "^gclid");
        assert!(matcher.matches("gclid", Some("x")));
    }

    #[test]
    fn invalid_regex_is_error() {
        let err = ParamMatcher::compile("/([a-z/").unwrap_err();
        assert!(matches!(err, MatcherError::InvalidRegex { .. }));
        assert!(matches!(ParamMatcher::compile(""), Err(MatcherError::Empty)));
        assert!(matches!(ParamMatcher::compile("//"), Err(MatcherError::Empty)));
        assert!(matches!(ParamMatcher::compile("//i"), Err(MatcherError::Empty)));
    }

    #[test]
    fn equality_ignores_compiled_state() {
        let a = ParamMatcher::compile("/^utm_/i").unwrap();
        let b = ParamMatcher::compile("/^utm_/i").unwrap();
        let c = ParamMatcher::compile("/^utm_/").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

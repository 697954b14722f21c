//! Query string utilities
//!
//! Splits a raw query into parameters while keeping the original text of
//! each pair, so retained parameters can be re-emitted byte for byte.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

// =============================================================================
// Query Parameters
// =============================================================================

/// One `name[=value]` item of a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam<'a> {
    /// The pair exactly as it appeared in the URL
    pub raw: &'a str,
    /// Percent-decoded name
    pub name: Cow<'a, str>,
    /// Percent-decoded value, `None` when the pair has no `=`
    pub value: Option<Cow<'a, str>>,
}

impl<'a> QueryParam<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let (name, value) = match raw.find('=') {
            Some(eq_pos) => (&raw[..eq_pos], Some(&raw[eq_pos + 1..])),
            None => (raw, None),
        };

        Self {
            raw,
            name: decode_component(name),
            value: value.map(decode_component),
        }
    }
}

/// Split a query (without the leading `?`) into parameters, in order.
/// Empty segments from `&&` or a trailing `&` are skipped.
pub fn split_query(query: &str) -> Vec<QueryParam<'_>> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(QueryParam::parse)
        .collect()
}

/// Join retained pairs back into a query string.
pub fn join_query<'a, I>(pairs: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for pair in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(pair);
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Percent-decode without treating `+` as a space.
#[inline]
fn decode_component(s: &str) -> Cow<'_, str> {
    if !s.contains('%') {
        return Cow::Borrowed(s);
    }
    percent_decode_str(s).decode_utf8_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_query() {
        let params = split_query("a=1&b&c=&d=x=y");
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].name, "a");
        assert_eq!(params[0].value.as_deref(), Some("1"));
        assert_eq!(params[1].name, "b");
        assert_eq!(params[1].value, None);
        assert_eq!(params[2].value.as_deref(), Some(""));
        assert_eq!(params[3].name, "d");
        assert_eq!(params[3].value.as_deref(), Some("x=y"));
    }

    #[test]
    fn test_split_query_skips_empty_segments() {
        let params = split_query("&a=1&&b=2&");
        let names: Vec<_> = params.iter().map(|p| p.name.as_ref()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_percent_decoding() {
        let params = split_query("utm%5Fsource=a%20b&q=c+d");
        assert_eq!(params[0].name, "utm_source");
        assert_eq!(params[0].value.as_deref(), Some("a b"));
        assert_eq!(params[0].raw, "utm%5Fsource=a%20b");
        assert_eq!(params[1].value.as_deref(), Some("c+d"));
    }

    #[test]
    fn test_join_query() {
        assert_eq!(join_query(["a=1", "b"]), Some("a=1&b".to_string()));
        assert_eq!(join_query(Vec::<&str>::new()), None);
    }
}

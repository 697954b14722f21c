//! URL Rewrite Engine
//!
//! Removes every query parameter that some applicable removal rule matches
//! and no applicable exception rule matches. Retained parameters keep their
//! original order and encoding.

use ::url::Url;
use log::trace;

use crate::types::{Rule, RuleSet};
use crate::url::{join_query, split_query};

/// Why a URL could not be considered for cleaning.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ::url::ParseError),
    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("URL has no query parameters")]
    NoQuery,
}

/// A rewritten URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleaned {
    pub url: String,
    /// Decoded names of the dropped parameters, in URL order
    pub removed: Vec<String>,
}

/// Cleaner bound to one rule snapshot.
#[derive(Debug, Clone, Default)]
pub struct UrlCleaner {
    rules: RuleSet,
}

impl UrlCleaner {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the cleaned URL, or `None` when nothing changed or the input
    /// is not an http(s) URL with a host and a query.
    pub fn clean(&self, url: &str) -> Option<String> {
        clean(url, &self.rules)
    }

    /// Like [`clean`](Self::clean) but tells rejected input apart from a
    /// URL with nothing to remove (`Ok(None)`).
    pub fn try_clean(&self, url: &str) -> Result<Option<Cleaned>, CleanError> {
        try_clean(url, &self.rules)
    }
}

/// Clean `url` against `rules`.
pub fn clean(url: &str, rules: &[Rule]) -> Option<String> {
    match try_clean(url, rules) {
        Ok(Some(cleaned)) => Some(cleaned.url),
        Ok(None) | Err(_) => None,
    }
}

/// Clean `url` against `rules`, reporting why a URL was rejected.
pub fn try_clean(url: &str, rules: &[Rule]) -> Result<Option<Cleaned>, CleanError> {
    let input = url.trim_matches(|ch: char| ch <= ' ');
    let parsed = Url::parse(input)?;

    let scheme = parsed.scheme();
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(CleanError::UnsupportedScheme(scheme.to_string()));
    }

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase(),
        _ => return Err(CleanError::MissingHost),
    };

    parsed.query().ok_or(CleanError::NoQuery)?;

    // Splice into the text as typed so the path and host keep their form.
    // Tabs and newlines are stripped by the parser; fall back to its output.
    let serialized;
    let source = if input.contains(['\t', '\n', '\r']) {
        serialized = parsed.to_string();
        serialized.as_str()
    } else {
        input
    };
    let (head, query, fragment) = split_raw(source).ok_or(CleanError::NoQuery)?;

    let params = split_query(query);
    if params.is_empty() {
        return Err(CleanError::NoQuery);
    }

    let (exceptions, removals): (Vec<&Rule>, Vec<&Rule>) = rules
        .iter()
        .filter(|rule| rule.applies_to(&host))
        .partition(|rule| rule.is_exception);

    if removals.is_empty() {
        return Ok(None);
    }

    let mut kept = Vec::with_capacity(params.len());
    let mut removed = Vec::new();

    for param in &params {
        let name = param.name.as_ref();
        let value = param.value.as_deref();

        let remove = removals.iter().any(|rule| rule.matcher.matches(name, value))
            && !exceptions.iter().any(|rule| rule.matcher.matches(name, value));

        if remove {
            trace!("removing '{}' from {}", name, host);
            removed.push(name.to_string());
        } else {
            kept.push(param.raw);
        }
    }

    if removed.is_empty() {
        return Ok(None);
    }

    let mut cleaned = String::with_capacity(source.len());
    cleaned.push_str(head);
    if let Some(query) = join_query(kept) {
        cleaned.push('?');
        cleaned.push_str(&query);
    }
    cleaned.push_str(fragment);

    Ok(Some(Cleaned {
        url: cleaned,
        removed,
    }))
}

/// `scheme://host/path`, query, and `#fragment` (possibly empty) of a URL
/// string. The query starts at the first `?` ahead of any `#`.
fn split_raw(url: &str) -> Option<(&str, &str, &str)> {
    let query_start = url.find(['?', '#']).filter(|&i| url.as_bytes()[i] == b'?')?;
    let (head, rest) = (&url[..query_start], &url[query_start + 1..]);
    match rest.find('#') {
        Some(i) => Some((head, &rest[..i], &rest[i..])),
        None => Some((head, rest, "")),
    }
}

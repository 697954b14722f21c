//! Nutcracker Core Library
//!
//! This crate provides the matching engine that strips tracking query
//! parameters from URLs according to `removeparam` filter rules.
//!
//! # Architecture
//!
//! Filter lists are compiled (by `nc-compiler`) into an ordered [`RuleSet`].
//! A rule set is an immutable snapshot: the rewrite engine only ever reads it,
//! so callers that refresh their lists swap in a new snapshot instead of
//! mutating the one in use.
//!
//! # Modules
//!
//! - `types`: `Rule` and the `RuleSet` snapshot
//! - `matcher`: parameter matchers (exact name or regex)
//! - `domain`: domain scope evaluation
//! - `url`: query string splitting
//! - `cleaner`: the URL rewrite engine

pub mod cleaner;
pub mod domain;
pub mod matcher;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use cleaner::{clean, CleanError, Cleaned, UrlCleaner};
pub use domain::domain_applies;
pub use matcher::{MatcherError, ParamMatcher};
pub use types::{Rule, RuleSet};

//! Core type definitions for Nutcracker
//!
//! A compiled filter list is an ordered [`RuleSet`] of [`Rule`]s. Both are
//! immutable once built.

use std::ops::Deref;
use std::sync::Arc;

use crate::domain::domain_applies;
use crate::matcher::ParamMatcher;

// =============================================================================
// Rule
// =============================================================================

/// A compiled `removeparam` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Exception rule (@@...) - keeps matching parameters instead of removing them
    pub is_exception: bool,
    /// Domain scope in parse order; empty applies to every host
    pub domains: Vec<String>,
    /// Parameter matcher
    pub matcher: ParamMatcher,
}

impl Rule {
    pub fn new(is_exception: bool, domains: Vec<String>, matcher: ParamMatcher) -> Self {
        Self {
            is_exception,
            domains,
            matcher,
        }
    }

    /// Does this rule's domain scope cover `host`?
    #[inline]
    pub fn applies_to(&self, host: &str) -> bool {
        domain_applies(self, host)
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// Read-only snapshot of compiled rules.
///
/// Cloning shares the underlying storage, so a snapshot can be handed to a
/// background cleaner while the owner builds its replacement.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    pub fn exception_count(&self) -> usize {
        self.rules.iter().filter(|rule| rule.is_exception).count()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Deref for RuleSet {
    type Target = [Rule];

    fn deref(&self) -> &[Rule] {
        &self.rules
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

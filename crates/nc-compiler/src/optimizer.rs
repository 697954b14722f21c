use std::collections::HashSet;

use nc_core::matcher::ParamMatcher;
use nc_core::types::Rule;

pub struct OptimizeStats {
    pub before: usize,
    pub after: usize,
    pub deduped: usize,
}

/// Drop exact duplicate rules, keeping the first occurrence and the
/// relative order of the rest. Cleaning only asks whether *any* rule
/// matches, so duplicates never change a result.
pub fn optimize_rules(rules: &mut Vec<Rule>) -> OptimizeStats {
    let before = rules.len();

    let mut seen: HashSet<RuleKey> = HashSet::new();
    rules.retain(|rule| seen.insert(RuleKey::from(rule)));

    let after = rules.len();

    OptimizeStats {
        before,
        after,
        deduped: before - after,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    is_exception: bool,
    domains: Vec<String>,
    is_regex: bool,
    case_insensitive: bool,
    source: String,
}

impl From<&Rule> for RuleKey {
    fn from(rule: &Rule) -> Self {
        let case_insensitive = match &rule.matcher {
            ParamMatcher::Regex {
                case_insensitive, ..
            } => *case_insensitive,
            ParamMatcher::Exact(_) => false,
        };

        Self {
            is_exception: rule.is_exception,
            domains: rule.domains.clone(),
            is_regex: rule.matcher.is_regex(),
            case_insensitive,
            source: rule.matcher.source().to_string(),
        }
    }
}

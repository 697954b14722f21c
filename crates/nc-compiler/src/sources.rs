//! Filter sources
//!
//! Combines the cached text of every enabled source, plus the user's custom
//! rules, into one [`RuleSet`] snapshot. Fetching and caching list text is
//! left to the caller through the `loader` closure.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use nc_core::types::{Rule, RuleSet};

use crate::optimizer::{optimize_rules, OptimizeStats};
use crate::parser::{parse_filter_list_with_stats, ParseStats};

pub const DEFAULT_SOURCE_NAME: &str = "LegitimateURLShortener";
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/DandelionSprout/adfilt/master/LegitimateURLShortener.txt";

/// A subscribed filter list, as stored in `sources.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSource {
    pub name: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FilterSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            is_enabled: true,
        }
    }

    pub fn default_source() -> Self {
        Self::new(DEFAULT_SOURCE_NAME, DEFAULT_SOURCE_URL)
    }

    /// File-name friendly form of the source name.
    pub fn slug(&self) -> String {
        let slug: String = self
            .name
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    ch.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let slug = slug.trim_matches('-');
        if slug.is_empty() {
            "source".to_string()
        } else {
            slug.to_string()
        }
    }
}

/// Per-list outcome of [`compile_sources`].
#[derive(Debug, Clone)]
pub struct ListReport {
    pub name: String,
    /// `false` when the loader had no text for this source
    pub loaded: bool,
    pub stats: ParseStats,
}

#[derive(Debug, Clone)]
pub struct SourceSetReport {
    pub rules: RuleSet,
    pub lists: Vec<ListReport>,
    pub deduped: usize,
}

pub const CUSTOM_RULES_NAME: &str = "custom";

/// Parse the enabled sources in order, then `custom_rules` if it is not
/// blank, and freeze the combined rules into a snapshot.
pub fn compile_sources<F>(sources: &[FilterSource], custom_rules: &str, mut loader: F) -> SourceSetReport
where
    F: FnMut(&FilterSource) -> Option<String>,
{
    let mut all_rules: Vec<Rule> = Vec::new();
    let mut lists = Vec::new();

    for source in sources.iter().filter(|source| source.is_enabled) {
        let Some(text) = loader(source) else {
            warn!("No cached rules for '{}' ({})", source.name, source.url);
            lists.push(ListReport {
                name: source.name.clone(),
                loaded: false,
                stats: ParseStats::default(),
            });
            continue;
        };

        let (rules, stats) = parse_filter_list_with_stats(&text);
        all_rules.extend(rules);
        lists.push(ListReport {
            name: source.name.clone(),
            loaded: true,
            stats,
        });
    }

    if !custom_rules.trim().is_empty() {
        let (rules, stats) = parse_filter_list_with_stats(custom_rules);
        all_rules.extend(rules);
        lists.push(ListReport {
            name: CUSTOM_RULES_NAME.to_string(),
            loaded: true,
            stats,
        });
    }

    let OptimizeStats { after, deduped, .. } = optimize_rules(&mut all_rules);
    info!("Compiled {} rules from {} lists ({} duplicates dropped)", after, lists.len(), deduped);

    SourceSetReport {
        rules: RuleSet::new(all_rules),
        lists,
        deduped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(source: &FilterSource) -> Option<String> {
        match source.name.as_str() {
            "tracking" => Some("||example.com^$removeparam=fbclid\n*$removeparam=/^utm_/".to_string()),
            "other" => Some("@@||safe.com^$removeparam=fbclid\n*$removeparam=/^utm_/".to_string()),
            _ => None,
        }
    }

    #[test]
    fn combines_enabled_sources_then_custom_rules() {
        let mut disabled = FilterSource::new("other", "https://example.org/other.txt");
        disabled.is_enabled = false;
        let sources = vec![
            FilterSource::new("tracking", "https://example.org/tracking.txt"),
            disabled,
        ];

        let report = compile_sources(&sources, "*$removeparam=gclid", loader);

        assert_eq!(report.rules.len(), 3);
        assert_eq!(report.rules[2].matcher.source(), "gclid");
        assert_eq!(report.lists.len(), 2);
        assert_eq!(report.lists[1].name, CUSTOM_RULES_NAME);
    }

    #[test]
    fn blank_custom_rules_are_ignored() {
        let sources = vec![FilterSource::new("tracking", "u")];
        let report = compile_sources(&sources, "  \n\t", loader);
        assert_eq!(report.lists.len(), 1);
        assert_eq!(report.rules.len(), 2);
    }

    #[test]
    fn missing_cache_is_reported() {
        let sources = vec![FilterSource::new("never-fetched", "u"), FilterSource::new("tracking", "u")];
        let report = compile_sources(&sources, "", loader);
        assert!(!report.lists[0].loaded);
        assert!(report.lists[1].loaded);
        assert_eq!(report.lists[1].stats.rules, 2);
    }

    #[test]
    fn duplicates_across_lists_are_dropped() {
        let sources = vec![FilterSource::new("tracking", "u"), FilterSource::new("other", "u")];
        let report = compile_sources(&sources, "", loader);
        assert_eq!(report.deduped, 1);
        assert_eq!(report.rules.len(), 3);
    }

    #[test]
    fn compiled_rules_clean_urls() {
        let sources = vec![FilterSource::new("tracking", "u"), FilterSource::new("other", "u")];
        let report = compile_sources(&sources, "", loader);

        assert_eq!(
            nc_core::clean("https://example.com/?fbclid=1&utm_source=x&id=2", &report.rules).as_deref(),
            Some("https://example.com/?id=2")
        );
    }

    #[test]
    fn source_manifest_round_trip() {
        let json = r#"[{"name":"LegitimateURLShortener","url":"https://example.org/l.txt"},
                       {"name":"Mine","url":"https://example.org/m.txt","isEnabled":false}]"#;
        let sources: Vec<FilterSource> = serde_json::from_str(json).unwrap();
        assert!(sources[0].is_enabled);
        assert!(!sources[1].is_enabled);
        assert!(serde_json::to_string(&sources[1]).unwrap().contains("\"isEnabled\":false"));
    }

    #[test]
    fn slug_is_file_name_safe() {
        assert_eq!(FilterSource::default_source().slug(), "legitimateurlshortener");
        assert_eq!(FilterSource::new("My List (EU)", "u").slug(), "my-list--eu");
        assert_eq!(FilterSource::new("!!!", "u").slug(), "source");
    }
}

use log::debug;

use nc_core::matcher::{MatcherError, ParamMatcher};
use nc_core::types::Rule;

/// How a single filter-list line was handled.
#[derive(Debug)]
pub enum LineOutcome {
    Blank,
    Comment,
    /// Element hiding or scriptlet rule (`##`, `#@#`, `##+js`)
    Cosmetic,
    /// Network rule without `removeparam`
    Unrelated,
    Malformed(SkipReason),
    Rule(Rule),
}

/// Why a `removeparam` line produced no rule.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("no options separator")]
    MissingSeparator,
    #[error("no removeparam=<value> option")]
    MissingValue,
    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

/// Line counts collected while parsing one list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub blank: usize,
    pub comments: usize,
    pub cosmetic: usize,
    pub unrelated: usize,
    pub malformed: usize,
    pub rules: usize,
}

impl ParseStats {
    fn record(&mut self, outcome: &LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Blank => self.blank += 1,
            LineOutcome::Comment => self.comments += 1,
            LineOutcome::Cosmetic => self.cosmetic += 1,
            LineOutcome::Unrelated => self.unrelated += 1,
            LineOutcome::Malformed(_) => self.malformed += 1,
            LineOutcome::Rule(_) => self.rules += 1,
        }
    }
}

pub fn parse_filter_list(text: &str) -> Vec<Rule> {
    parse_filter_list_with_stats(text).0
}

pub fn parse_filter_list_with_stats(text: &str) -> (Vec<Rule>, ParseStats) {
    let mut rules = Vec::new();
    let mut stats = ParseStats::default();

    for (idx, raw_line) in split_lines(text).enumerate() {
        let outcome = parse_line(raw_line);
        stats.record(&outcome);

        match outcome {
            LineOutcome::Rule(rule) => rules.push(rule),
            LineOutcome::Malformed(reason) => {
                debug!("skipping line {}: {} ({})", idx + 1, reason, raw_line.trim());
            }
            _ => {}
        }
    }

    (rules, stats)
}

/// Split on every Unicode line break (`\n`, `\r`, VT, FF, NEL, U+2028,
/// U+2029), with `\r\n` counted once. A trailing break adds no empty line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        let Some(start) = current.find(is_line_break) else {
            rest = None;
            return (!current.is_empty()).then_some(current);
        };

        let brk = current[start..].chars().next()?;
        let mut end = start + brk.len_utf8();
        if brk == '\r' && current[end..].starts_with('\n') {
            end += 1;
        }
        rest = Some(&current[end..]).filter(|tail| !tail.is_empty());
        Some(&current[..start])
    })
}

#[inline]
fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

pub fn parse_line(raw_line: &str) -> LineOutcome {
    let mut line = raw_line.trim();
    if line.is_empty() {
        return LineOutcome::Blank;
    }
    if is_comment_line(line) {
        return LineOutcome::Comment;
    }

    if line.contains("##") || line.contains("#@#") || line.contains("##+js") {
        return LineOutcome::Cosmetic;
    }

    if !line.contains("removeparam") {
        return LineOutcome::Unrelated;
    }

    let mut is_exception = false;
    if let Some(rest) = line.strip_prefix("@@") {
        is_exception = true;
        line = rest;
    }

    match parse_removeparam_rule(line, is_exception) {
        Ok(rule) => LineOutcome::Rule(rule),
        Err(reason) => LineOutcome::Malformed(reason),
    }
}

fn parse_removeparam_rule(line: &str, is_exception: bool) -> Result<Rule, SkipReason> {
    let (pattern, options_text) = split_rule_options(line).ok_or(SkipReason::MissingSeparator)?;
    let options = split_options(options_text);

    let value = find_removeparam_value(&options).ok_or(SkipReason::MissingValue)?;
    let matcher = ParamMatcher::compile(value)?;
    let domains = parse_domains(pattern, &options);

    Ok(Rule::new(is_exception, domains, matcher))
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('!')
}

/// Every `/` toggles whether we are inside a regex literal.
#[derive(Default)]
struct RegexToggle {
    inside: bool,
}

impl RegexToggle {
    #[inline]
    fn step(&mut self, ch: char) -> bool {
        if ch == '/' {
            self.inside = !self.inside;
        }
        self.inside
    }
}

/// Split at the first `$` outside a regex literal, so `/^foo$/` stays intact.
fn split_rule_options(line: &str) -> Option<(&str, &str)> {
    let mut toggle = RegexToggle::default();
    for (i, ch) in line.char_indices() {
        let in_regex = toggle.step(ch);
        if ch == '$' && !in_regex {
            return Some((&line[..i], &line[i + 1..]));
        }
    }
    None
}

/// Split options on `,` outside regex literals; tokens are trimmed and empty ones dropped.
fn split_options(text: &str) -> Vec<&str> {
    let mut options = Vec::new();
    let mut toggle = RegexToggle::default();
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        let in_regex = toggle.step(ch);
        if ch == ',' && !in_regex {
            push_option(&mut options, &text[start..i]);
            start = i + 1;
        }
    }
    push_option(&mut options, &text[start..]);

    options
}

#[inline]
fn push_option<'a>(options: &mut Vec<&'a str>, raw: &'a str) {
    let raw = raw.trim();
    if !raw.is_empty() {
        options.push(raw);
    }
}

/// First `removeparam=<value>` with a non-empty value. A bare `removeparam`
/// would strip every parameter and is never honored.
fn find_removeparam_value<'a>(options: &[&'a str]) -> Option<&'a str> {
    options
        .iter()
        .copied()
        .filter_map(|option| option.strip_prefix("removeparam="))
        .find(|value| !value.is_empty())
}

fn parse_domains(pattern: &str, options: &[&str]) -> Vec<String> {
    let mut domains = Vec::new();

    if let Some(domain) = parse_host_anchor(pattern) {
        domains.push(domain.to_string());
    }

    for option in options {
        if let Some(list) = option.strip_prefix("domain=") {
            parse_domain_option(list, &mut domains);
        }
    }

    domains
}

/// `||host^...` -> `host`; `||label.*` -> `label` (wildcard TLD).
fn parse_host_anchor(pattern: &str) -> Option<&str> {
    let rest = pattern.strip_prefix("||")?;

    let end = rest
        .find(|ch: char| ch == '^' || ch == '/' || ch == '$')
        .unwrap_or(rest.len());
    let host = &rest[..end];
    if host.is_empty() {
        return None;
    }

    Some(host.strip_suffix(".*").unwrap_or(host))
}

/// Append the included entries of `a.com|~b.com|c.org`. Negated entries
/// are dropped, not treated as exclusions.
fn parse_domain_option(value: &str, domains: &mut Vec<String>) {
    for raw in value.split('|') {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('~') {
            continue;
        }
        domains.push(raw.to_string());
    }
}

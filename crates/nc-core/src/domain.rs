//! Domain scope evaluation
//!
//! A rule's domain list comes from its `||host^` anchor and any `domain=`
//! option. Tokens containing a dot match the host and its subdomains. Tokens
//! without a dot come from `||label.*` anchors and match `label` followed by
//! any TLD.

use crate::types::Rule;

/// Does `rule` apply to `host`? An empty scope applies everywhere.
pub fn domain_applies(rule: &Rule, host: &str) -> bool {
    if rule.domains.is_empty() {
        return true;
    }

    let host = host.to_lowercase();
    rule.domains
        .iter()
        .any(|domain| host_matches_domain(&host, &domain.to_lowercase()))
}

/// Match an already lowercased host against one lowercased scope token.
#[inline]
pub fn host_matches_domain(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }

    if domain.contains('.') {
        return is_subdomain_of(host, domain);
    }

    // Wildcard TLD: "bing" covers bing.com, www.bing.de, ...
    let len = domain.len();
    (host.len() > len && host.starts_with(domain) && host.as_bytes()[len] == b'.')
        || host.contains(&format!(".{domain}."))
}

#[inline]
fn is_subdomain_of(host: &str, domain: &str) -> bool {
    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ParamMatcher;

    fn scoped(domains: &[&str]) -> Rule {
        Rule::new(
            false,
            domains.iter().map(|d| d.to_string()).collect(),
            ParamMatcher::Exact("x".to_string()),
        )
    }

    #[test]
    fn empty_scope_applies_everywhere() {
        let rule = scoped(&[]);
        assert!(domain_applies(&rule, "example.com"));
        assert!(domain_applies(&rule, ""));
    }

    #[test]
    fn dotted_domain_matches_subdomains() {
        let rule = scoped(&["example.com"]);
        assert!(domain_applies(&rule, "example.com"));
        assert!(domain_applies(&rule, "sub.example.com"));
        assert!(domain_applies(&rule, "a.b.example.com"));
        assert!(!domain_applies(&rule, "notexample.com"));
        assert!(!domain_applies(&rule, "example.com.evil.net"));
    }

    #[test]
    fn wildcard_tld_matches_any_suffix() {
        let rule = scoped(&["bing"]);
        assert!(domain_applies(&rule, "bing.com"));
        assert!(domain_applies(&rule, "bing.de"));
        assert!(domain_applies(&rule, "www.bing.com"));
        assert!(domain_applies(&rule, "bing"));
        assert!(!domain_applies(&rule, "bingx.com"));
        assert!(!domain_applies(&rule, "xbing.com"));
        assert!(!domain_applies(&rule, "www.bing"));
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let rule = scoped(&["Example.COM", "Bing"]);
        assert!(domain_applies(&rule, "WWW.EXAMPLE.com"));
        assert!(domain_applies(&rule, "BING.co.uk"));
    }

    #[test]
    fn any_token_is_enough() {
        let rule = scoped(&["example.com", "test.org"]);
        assert!(domain_applies(&rule, "test.org"));
        assert!(!domain_applies(&rule, "other.net"));
    }
}

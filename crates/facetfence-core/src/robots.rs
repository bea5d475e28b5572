//! robots.txt guidance for the storefront's `robots.txt.liquid` template.
//!
//! Faceted URLs are never disallowed here: crawlers must be able to fetch
//! them to see `noindex,follow`. Only paths with no indexable variant at all
//! (site search, tracking-tagged links) are blocked.

use crate::policy::RobotsDirective;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DISALLOW: [&str; 2] = ["/search", "/*?utm_*"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsTxtPolicy {
    pub user_agent: String,
    pub disallow: Vec<String>,
}

impl Default for RobotsTxtPolicy {
    fn default() -> Self {
        Self {
            user_agent: "*".to_string(),
            disallow: DEFAULT_DISALLOW.iter().map(|rule| rule.to_string()).collect(),
        }
    }
}

impl RobotsTxtPolicy {
    pub fn new(disallow: Vec<String>) -> Self {
        Self {
            disallow,
            ..Self::default()
        }
    }

    /// Plain robots.txt group, for previewing before publishing.
    pub fn render(&self) -> String {
        let mut out = format!("User-agent: {}\n", self.user_agent);
        for rule in &self.disallow {
            out.push_str(&format!("Disallow: {}\n", rule));
        }
        out
    }

    /// Liquid block appending the rules to Shopify's default `*` group.
    pub fn render_liquid(&self) -> String {
        let mut out = String::from("{% for group in robots.default_groups %}\n");
        out.push_str("  {{- group.user_agent }}\n");
        out.push_str("  {%- for rule in group.rules -%}\n");
        out.push_str("    {{ rule }}\n");
        out.push_str("  {%- endfor -%}\n");
        out.push_str(&format!(
            "  {{%- if group.user_agent.value == '{}' -%}}\n",
            self.user_agent
        ));
        for rule in &self.disallow {
            out.push_str(&format!("    {{{{ 'Disallow: {}' }}}}\n", rule));
        }
        out.push_str("  {%- endif -%}\n");
        out.push_str("  {%- if group.sitemap != blank -%}\n");
        out.push_str("    {{ group.sitemap }}\n");
        out.push_str("  {%- endif -%}\n");
        out.push_str("{% endfor %}\n");
        out
    }

    /// Whether `path_and_query` matches a disallow rule.
    ///
    /// Rules use robots.txt matching: anchored at the start of the path,
    /// `*` matches any run of characters, a trailing `$` anchors the end.
    pub fn blocks(&self, path_and_query: &str) -> bool {
        self.disallow
            .iter()
            .any(|rule| !rule.is_empty() && rule_matches(rule, path_and_query))
    }

    /// Whether the rendered guidance honors a classifier directive: every
    /// variant of [`RobotsDirective`] keeps the URL crawlable.
    pub fn honors(&self, directive: RobotsDirective, path_and_query: &str) -> bool {
        match directive {
            RobotsDirective::Allow | RobotsDirective::AllowWithNoindexHandlingDuplication => {
                !self.blocks(path_and_query)
            }
        }
    }
}

fn rule_matches(rule: &str, path: &str) -> bool {
    let (pattern, anchored) = match rule.strip_suffix('$') {
        Some(pattern) => (pattern, true),
        None => (rule, false),
    };
    let pattern = pattern.as_bytes();
    let path = path.as_bytes();

    // matched[j]: pattern[..i] can match path[..j].
    let mut matched = vec![false; path.len() + 1];
    matched[0] = true;
    for &token in pattern {
        let mut next = vec![false; path.len() + 1];
        if token == b'*' {
            let mut seen = false;
            for j in 0..=path.len() {
                seen |= matched[j];
                next[j] = seen;
            }
        } else {
            for j in 0..path.len() {
                next[j + 1] = matched[j] && path[j] == token;
            }
        }
        matched = next;
    }

    if anchored {
        matched[path.len()]
    } else {
        matched.iter().any(|&hit| hit)
    }
}

use crate::policy::{CanonicalInstruction, PolicyResult, Verdict};
use serde::{Deserialize, Serialize};

pub const NOINDEX_FOLLOW: &str = "noindex,follow";

/// Head tags the theme extension injects for a classified URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadDirectives {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_robots: Option<String>,
    pub canonical_href: String,
}

impl HeadDirectives {
    /// `self_url` is used for self-canonical pages, `clean_url` otherwise.
    /// Callers pass the URL without fragment or tracking parameters as
    /// `self_url` (see [`crate::DetectedUrl::self_url`]).
    pub fn for_result(result: &PolicyResult, self_url: &str, clean_url: &str) -> Self {
        let meta_robots = match result.verdict {
            Verdict::Index => None,
            Verdict::Noindex => Some(NOINDEX_FOLLOW.to_string()),
        };
        let canonical_href = match result.canonical_instruction {
            CanonicalInstruction::SelfCanonical => self_url,
            CanonicalInstruction::CanonicalToCleanUrl => clean_url,
        }
        .to_string();

        Self {
            meta_robots,
            canonical_href,
        }
    }

    pub fn render_html(&self) -> String {
        let mut lines = Vec::with_capacity(2);
        if let Some(content) = &self.meta_robots {
            lines.push(format!(
                "<meta name=\"robots\" content=\"{}\">",
                escape_attr(content)
            ));
        }
        lines.push(format!(
            "<link rel=\"canonical\" href=\"{}\">",
            escape_attr(&self.canonical_href)
        ));
        lines.join("\n")
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterFlags;
    use crate::policy::classify;

    #[test]
    fn noindex_result_points_canonical_at_clean_url() {
        let result = classify(ParameterFlags::new(true, true, false));
        let tags = HeadDirectives::for_result(
            &result,
            "https://s.example/collections/all?sort_by=price-ascending",
            "https://s.example/collections/all",
        );
        assert_eq!(tags.meta_robots.as_deref(), Some("noindex,follow"));
        assert_eq!(tags.canonical_href, "https://s.example/collections/all");
        assert_eq!(
            tags.render_html(),
            "<meta name=\"robots\" content=\"noindex,follow\">\n\
             <link rel=\"canonical\" href=\"https://s.example/collections/all\">"
        );
    }

    #[test]
    fn index_result_is_self_canonical_without_meta_robots() {
        let result = classify(ParameterFlags::default());
        let tags = HeadDirectives::for_result(
            &result,
            "https://s.example/collections/all",
            "https://s.example/collections/all",
        );
        assert_eq!(tags.meta_robots, None);
        assert_eq!(
            tags.render_html(),
            "<link rel=\"canonical\" href=\"https://s.example/collections/all\">"
        );
    }

    #[test]
    fn tracking_params_never_reach_self_canonical() {
        let detected =
            crate::detect::detect_url("https://s.example/products/tee?utm_source=ig").unwrap();
        let result = classify(detected.flags);
        let tags = HeadDirectives::for_result(&result, &detected.self_url, &detected.clean_url);
        assert_eq!(tags.meta_robots, None);
        assert_eq!(tags.canonical_href, "https://s.example/products/tee");
    }

    #[test]
    fn attribute_values_are_escaped() {
        let tags = HeadDirectives {
            meta_robots: None,
            canonical_href: "/search?q=\"a\"&b=<c>".to_string(),
        };
        assert_eq!(
            tags.render_html(),
            "<link rel=\"canonical\" href=\"/search?q=&quot;a&quot;&amp;b=&lt;c&gt;\">"
        );
    }
}

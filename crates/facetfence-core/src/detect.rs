use crate::error::PolicyError;
use crate::params::ParameterFlags;
use serde::{Deserialize, Serialize};
use url::Url;

// Base for storefront-relative paths such as `/collections/all?page=2`.
const RELATIVE_BASE: &str = "https://storefront.invalid/";

/// Query keys with this prefix are campaign tracking, never page content.
pub const TRACKING_PARAM_PREFIX: &str = "utm_";

/// A storefront URL with its faceted parameters detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedUrl {
    pub original: String,
    /// Same URL with query and fragment stripped.
    pub clean_url: String,
    /// Canonical for an indexable URL: fragment and `utm_*` tracking
    /// parameters dropped, every other parameter kept.
    pub self_url: String,
    /// Path plus query as a crawler requests it, for robots.txt matching.
    pub path_and_query: String,
    pub flags: ParameterFlags,
}

/// Detect faceted parameters on a storefront URL.
///
/// Accepts absolute `http`/`https` URLs and root-relative paths. For a
/// relative input the clean URL is the bare path.
pub fn detect_url(raw: &str) -> Result<DetectedUrl, PolicyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PolicyError::InvalidUrl("empty url".to_string()));
    }

    let relative = trimmed.starts_with('/') && !trimmed.starts_with("//");
    let parsed = if relative {
        Url::parse(RELATIVE_BASE).and_then(|base| base.join(trimmed))
    } else {
        Url::parse(trimmed)
    };
    let parsed =
        parsed.map_err(|err| PolicyError::InvalidUrl(format!("{}: {}", trimmed, err)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PolicyError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    let flags = ParameterFlags::from_query_pairs(parsed.query_pairs());
    let path_and_query = match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    };

    let kept = parsed
        .query_pairs()
        .filter(|(key, _)| !key.starts_with(TRACKING_PARAM_PREFIX))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();
    let mut self_canonical = parsed.clone();
    self_canonical.set_fragment(None);
    if kept.is_empty() {
        self_canonical.set_query(None);
    } else {
        self_canonical.query_pairs_mut().clear().extend_pairs(kept);
    }

    let mut clean = parsed;
    clean.set_query(None);
    clean.set_fragment(None);

    Ok(DetectedUrl {
        original: trimmed.to_string(),
        clean_url: render(&clean, relative),
        self_url: render(&self_canonical, relative),
        path_and_query,
        flags,
    })
}

fn render(url: &Url, relative: bool) -> String {
    if !relative {
        return url.to_string();
    }
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

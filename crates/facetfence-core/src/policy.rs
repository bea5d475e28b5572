use crate::params::{FacetParam, ParameterFlags};
use serde::{Deserialize, Serialize};

const CLEAN_EXPLANATION: &str = "No faceted parameters detected. Safe to index.";

/// Whether the evaluated URL should be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Index,
    Noindex,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Index => "Index",
            Verdict::Noindex => "Noindex",
        }
    }
}

/// Where `rel=canonical` should point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalInstruction {
    SelfCanonical,
    CanonicalToCleanUrl,
}

impl CanonicalInstruction {
    pub fn label(self) -> &'static str {
        match self {
            CanonicalInstruction::SelfCanonical => "Self",
            CanonicalInstruction::CanonicalToCleanUrl => "Canonical → Clean URL (no params)",
        }
    }
}

/// robots.txt treatment for the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotsDirective {
    Allow,
    /// Crawling stays allowed; the noindex meta tag does the deduplication.
    AllowWithNoindexHandlingDuplication,
}

impl RobotsDirective {
    pub fn label(self) -> &'static str {
        match self {
            RobotsDirective::Allow => "Allow",
            RobotsDirective::AllowWithNoindexHandlingDuplication => {
                "Allow (noindex handles duplication)"
            }
        }
    }
}

/// Policy applied to one faceted URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResult {
    pub verdict: Verdict,
    pub canonical_instruction: CanonicalInstruction,
    pub robots_directive: RobotsDirective,
    pub explanation: String,
    pub active_params: Vec<FacetParam>,
}

/// Classify a set of faceted-parameter flags.
///
/// Total over all eight inputs. Any active parameter yields noindex with a
/// canonical to the clean URL; the robots directive only looks at pagination.
pub fn classify(flags: ParameterFlags) -> PolicyResult {
    let active = flags.active();

    if active.is_empty() {
        return PolicyResult {
            verdict: Verdict::Index,
            canonical_instruction: CanonicalInstruction::SelfCanonical,
            robots_directive: RobotsDirective::Allow,
            explanation: CLEAN_EXPLANATION.to_string(),
            active_params: active,
        };
    }

    let robots_directive = if flags.has_page_param {
        RobotsDirective::AllowWithNoindexHandlingDuplication
    } else {
        RobotsDirective::Allow
    };

    let labels = active
        .iter()
        .map(|param| param.label())
        .collect::<Vec<_>>()
        .join(", ");

    PolicyResult {
        verdict: Verdict::Noindex,
        canonical_instruction: CanonicalInstruction::CanonicalToCleanUrl,
        robots_directive,
        explanation: format!(
            "Params detected: {}. Apply canonical to base and set meta robots noindex,follow.",
            labels
        ),
        active_params: active,
    }
}

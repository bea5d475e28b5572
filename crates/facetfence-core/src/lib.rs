//! FacetFence core: faceted-URL indexing policy for Shopify storefronts.
//!
//! Collection URLs carrying `filter.v.*`, `sort_by`, or `page` parameters
//! produce many near-duplicate crawlable variants of one listing. This crate
//! detects those parameters, classifies the URL into an index/noindex policy,
//! and renders the head tags and robots.txt guidance that enforce it. It
//! also validates lead and contact submissions for the intake service.

#![deny(unsafe_code)]

pub mod detect;
pub mod directives;
pub mod error;
pub mod intake;
pub mod params;
pub mod policy;
pub mod robots;

pub use detect::{detect_url, DetectedUrl, TRACKING_PARAM_PREFIX};
pub use directives::{HeadDirectives, NOINDEX_FOLLOW};
pub use error::{IntakeError, PolicyError};
pub use intake::{
    ContactMessage, ContactSubmission, Lead, LeadSubmission, MISSING_CONTACT_FIELDS,
    MISSING_LEAD_FIELDS,
};
pub use params::{FacetParam, ParameterFlags};
pub use policy::{classify, CanonicalInstruction, PolicyResult, RobotsDirective, Verdict};
pub use robots::{RobotsTxtPolicy, DEFAULT_DISALLOW};

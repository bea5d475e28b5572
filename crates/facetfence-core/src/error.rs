use thiserror::Error;

/// Failures while turning a raw storefront URL into policy input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Intake submission errors.
///
/// Both variants surface to clients as a 400 with a static message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("{0}")]
    MissingRequiredField(&'static str),

    #[error("Invalid JSON")]
    MalformedRequestBody,
}

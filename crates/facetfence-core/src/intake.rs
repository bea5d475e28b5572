//! Lead and contact form submissions.
//!
//! Bodies are parsed as untyped JSON first: only a syntax error (or a `null`
//! body, which has no fields to read) is a malformed body. Any other JSON
//! value is read field by field, and a field that is absent or falsy
//! (`null`, `false`, `0`, `""`) counts as missing. Arrays and scalars carry
//! no named fields, so every required field is missing.

use crate::error::IntakeError;
use serde::Serialize;
use serde_json::Value;

pub const MISSING_CONTACT_FIELDS: &str = "Missing email or message";
pub const MISSING_LEAD_FIELDS: &str = "Missing email or store";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub email: Option<String>,
    pub msg: Option<String>,
}

/// A contact message that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub email: String,
    pub msg: String,
}

impl ContactSubmission {
    pub fn from_json(bytes: &[u8]) -> Result<Self, IntakeError> {
        let body = parse_body(bytes)?;
        Ok(Self {
            email: truthy_field(&body, "email"),
            msg: truthy_field(&body, "msg"),
        })
    }

    pub fn validate(self) -> Result<ContactMessage, IntakeError> {
        match (present(self.email), present(self.msg)) {
            (Some(email), Some(msg)) => Ok(ContactMessage { email, msg }),
            _ => Err(IntakeError::MissingRequiredField(MISSING_CONTACT_FIELDS)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeadSubmission {
    pub email: Option<String>,
    pub store: Option<String>,
    pub plan: Option<String>,
}

/// An early-access lead that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub email: String,
    pub store: String,
    /// `None` when the form sent no plan; an empty plan is kept as `""`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl LeadSubmission {
    pub fn from_json(bytes: &[u8]) -> Result<Self, IntakeError> {
        let body = parse_body(bytes)?;
        Ok(Self {
            email: truthy_field(&body, "email"),
            store: truthy_field(&body, "store"),
            plan: optional_field(&body, "plan"),
        })
    }

    pub fn validate(self) -> Result<Lead, IntakeError> {
        match (present(self.email), present(self.store)) {
            (Some(email), Some(store)) => Ok(Lead {
                email,
                store,
                plan: self.plan,
            }),
            _ => Err(IntakeError::MissingRequiredField(MISSING_LEAD_FIELDS)),
        }
    }
}

fn parse_body(bytes: &[u8]) -> Result<Value, IntakeError> {
    match serde_json::from_slice(bytes) {
        Ok(Value::Null) | Err(_) => Err(IntakeError::MalformedRequestBody),
        Ok(body) => Ok(body),
    }
}

/// Field value as text, or `None` when absent or falsy.
///
/// Truthy non-string values (`5`, `true`, `{}`) are kept in their JSON form.
fn truthy_field(body: &Value, name: &str) -> Option<String> {
    match body.as_object()?.get(name)? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Field value as text, or `None` only when absent or `null`.
fn optional_field(body: &Value, name: &str) -> Option<String> {
    match body.as_object()?.get(name)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

// Empty strings count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

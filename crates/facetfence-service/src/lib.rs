#![deny(unsafe_code)]

pub mod sink;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use facetfence_core::{
    classify, detect_url, ContactSubmission, HeadDirectives, IntakeError, LeadSubmission,
    ParameterFlags, PolicyError, PolicyResult, RobotsTxtPolicy,
};
use serde::{Deserialize, Serialize};
use sink::{IntakeEvent, IntakeRecord, IntakeSink, TracingSink};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub const SERVICE_NAME: &str = "facetfence-service";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Request bodies above this size are rejected with 413.
    pub max_body_bytes: usize,
    /// robots.txt guidance published by `/policy/robots`.
    pub robots: RobotsTxtPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            robots: RobotsTxtPolicy::default(),
        }
    }
}

#[derive(Clone)]
pub struct ServiceState {
    pub config: Arc<ServiceConfig>,
    pub sink: Arc<dyn IntakeSink>,
    pub started_at: DateTime<Utc>,
}

impl ServiceState {
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(
        config: ServiceConfig,
        sink: Arc<dyn IntakeSink>,
    ) -> Result<Self, ServiceError> {
        if config.max_body_bytes == 0 {
            return Err(ServiceError::InvalidConfig(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            config: Arc::new(config),
            sink,
            started_at: Utc::now(),
        })
    }
}

pub fn build_router(state: ServiceState) -> Router {
    let routes = Router::new()
        .route("/contact", post(submit_contact).options(preflight))
        .route("/lead", post(submit_lead).options(preflight))
        .route("/policy/classify", post(classify_flags))
        .route("/policy/evaluate", get(evaluate_url))
        .route("/policy/robots", get(robots_guidance));

    Router::new()
        .route("/health", get(health))
        .merge(routes.clone())
        // Storefront forms post to the `/api` prefixed paths.
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid service configuration: {0}")]
    InvalidConfig(String),
}

/// Request-level failures. Every variant is a client error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("Invalid JSON")]
    InvalidJson,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("rejecting request: {}", self);
        (
            StatusCode::BAD_REQUEST,
            Json(Ack {
                ok: false,
                error: Some(self.to_string()),
            }),
        )
            .into_response()
    }
}

/// `{ ok, error? }` acknowledgment returned by intake endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }
}

pub fn accept_contact(state: &ServiceState, body: &[u8]) -> Result<Ack, ApiError> {
    let message = ContactSubmission::from_json(body)?.validate()?;
    state
        .sink
        .record(&IntakeEvent::now(IntakeRecord::Contact(message)));
    Ok(Ack::ok())
}

pub fn accept_lead(state: &ServiceState, body: &[u8]) -> Result<Ack, ApiError> {
    let lead = LeadSubmission::from_json(body)?.validate()?;
    state.sink.record(&IntakeEvent::now(IntakeRecord::Lead(lead)));
    Ok(Ack::ok())
}

/// Classifier output with the storefront display labels alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResponse {
    #[serde(flatten)]
    pub result: PolicyResult,
    pub verdict_label: String,
    pub canonical_label: String,
    pub robots_label: String,
}

impl From<PolicyResult> for PolicyResponse {
    fn from(result: PolicyResult) -> Self {
        Self {
            verdict_label: result.verdict.label().to_string(),
            canonical_label: result.canonical_instruction.label().to_string(),
            robots_label: result.robots_directive.label().to_string(),
            result,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub url: String,
    pub clean_url: String,
    pub flags: ParameterFlags,
    pub policy: PolicyResponse,
    pub directives: HeadDirectives,
    pub head_html: String,
    /// False when the published robots.txt rules would block this URL.
    pub crawl_allowed: bool,
}

pub fn evaluate(robots: &RobotsTxtPolicy, raw_url: &str) -> Result<EvaluateResponse, ApiError> {
    let detected = detect_url(raw_url)?;
    let result = classify(detected.flags);
    let directives = HeadDirectives::for_result(&result, &detected.self_url, &detected.clean_url);
    let head_html = directives.render_html();
    let crawl_allowed = robots.honors(result.robots_directive, &detected.path_and_query);

    Ok(EvaluateResponse {
        url: detected.original,
        clean_url: detected.clean_url,
        flags: detected.flags,
        policy: result.into(),
        directives,
        head_html,
        crawl_allowed,
    })
}

/// robots.txt rules plus the plain and Liquid renderings of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotsResponse {
    pub user_agent: String,
    pub disallow: Vec<String>,
    pub robots_txt: String,
    pub liquid: String,
}

impl From<&RobotsTxtPolicy> for RobotsResponse {
    fn from(policy: &RobotsTxtPolicy) -> Self {
        Self {
            user_agent: policy.user_agent.clone(),
            disallow: policy.disallow.clone(),
            robots_txt: policy.render(),
            liquid: policy.render_liquid(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    started_at: DateTime<Utc>,
}

async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        started_at: state.started_at,
    })
}

async fn preflight() -> Json<Ack> {
    Json(Ack::ok())
}

async fn submit_contact(
    State(state): State<ServiceState>,
    body: Bytes,
) -> Result<Json<Ack>, ApiError> {
    Ok(Json(accept_contact(&state, &body)?))
}

async fn submit_lead(
    State(state): State<ServiceState>,
    body: Bytes,
) -> Result<Json<Ack>, ApiError> {
    Ok(Json(accept_lead(&state, &body)?))
}

async fn classify_flags(body: Bytes) -> Result<Json<PolicyResponse>, ApiError> {
    let flags: ParameterFlags =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;
    Ok(Json(classify(flags).into()))
}

#[derive(Debug, Clone, Deserialize)]
struct EvaluateQuery {
    url: Option<String>,
}

async fn evaluate_url(
    State(state): State<ServiceState>,
    Query(query): Query<EvaluateQuery>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let raw_url = query
        .url
        .ok_or_else(|| PolicyError::InvalidUrl("missing url parameter".to_string()))?;
    Ok(Json(evaluate(&state.config.robots, &raw_url)?))
}

async fn robots_guidance(State(state): State<ServiceState>) -> Json<RobotsResponse> {
    Json(RobotsResponse::from(&state.config.robots))
}

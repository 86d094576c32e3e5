//! HTTP API of the proxy.
//!
//! - ANY  <route> (default /api/generate-plan): the proxy handler
//! - GET  /health
//!
//! The proxy route accepts every method so the credential check can run
//! before method validation.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{Config, API_KEY_ENV};
use crate::error::ProxyError;
use crate::gemini::{GeminiClient, GenerateContentRequest, GenerateContentResponse};

/// Returned when the upstream produced candidates but no text leaf.
pub const NO_TEXT_GENERATED: &str = "No text was generated.";

/// Application state shared across handlers. Immutable after startup.
pub struct AppState {
    pub config: Arc<Config>,
    pub gemini: GeminiClient,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let gemini = GeminiClient::new(&config.upstream);
        Arc::new(Self {
            config: Arc::new(config),
            gemini,
            start_time: Instant::now(),
        })
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let route = state.config.server.route.clone();

    Router::new()
        .route(&route, any(generate_plan))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Inbound body. `prompt` is kept untyped so JavaScript-style truthiness
/// can be applied to whatever the client sent.
#[derive(Debug, Default)]
pub struct GeneratePlanRequest {
    pub prompt: Option<Value>,
}

impl GeneratePlanRequest {
    /// Parse a raw body. Invalid JSON and a literal `null` are errors; any
    /// other JSON that is not an object simply has no prompt.
    pub fn from_body(body: &[u8]) -> Result<Self, ProxyError> {
        let value: Value = serde_json::from_slice(body)?;
        if value.is_null() {
            return Err(ProxyError::Unexpected(
                "cannot read property 'prompt' of a null request body".to_string(),
            ));
        }
        Ok(Self {
            prompt: value.get("prompt").cloned(),
        })
    }

    /// The prompt as text, or `None` if it is absent or falsy
    /// (`null`, `false`, `0`, `""`).
    pub fn prompt_text(&self) -> Option<String> {
        match self.prompt.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Success body: only the generated text.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePlanResponse {
    pub text: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub api_key_configured: bool,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn generate_plan(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4().to_string();

    match proxy(&state, &method, &body).await {
        Ok(response) => {
            info!(
                request_id = %request_id,
                text_len = response.text.len(),
                "Plan generated"
            );
            Json(response).into_response()
        }
        Err(err) => {
            if let ProxyError::Upstream { details } = &err {
                error!(request_id = %request_id, details = %details, "Gemini API error");
            } else if err.should_log() {
                error!(request_id = %request_id, error = %err, "Proxy execution error");
            }
            err.into_response()
        }
    }
}

/// The proxy contract: credential, method, prompt, upstream call, reshaping.
async fn proxy(
    state: &AppState,
    method: &Method,
    body: &[u8],
) -> Result<GeneratePlanResponse, ProxyError> {
    let api_key = state
        .config
        .api_key
        .as_ref()
        .ok_or(ProxyError::Configuration(API_KEY_ENV))?;

    if *method != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }

    let prompt = GeneratePlanRequest::from_body(body)?
        .prompt_text()
        .ok_or(ProxyError::MissingPrompt)?;

    let payload = GenerateContentRequest::for_prompt(prompt);
    let reply = state.gemini.generate_content(api_key, &payload).await?;

    let parsed = GenerateContentResponse::new(&reply.body);
    if reply.status.is_success() && parsed.has_candidates() {
        let text = parsed.generated_text().unwrap_or(NO_TEXT_GENERATED).to_string();
        return Ok(GeneratePlanResponse { text });
    }

    Err(ProxyError::Upstream {
        details: reply.body,
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        api_key_configured: state.config.api_key.is_some(),
    })
}

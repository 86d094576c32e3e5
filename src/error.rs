//! Error taxonomy for the proxy handler and its HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required server-side setting (the API key) is missing.
    #[error("Server configuration error: {0} is not set.")]
    Configuration(&'static str),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Missing prompt text in request body.")]
    MissingPrompt,

    /// Upstream answered non-2xx or without candidates. `details` is the
    /// upstream body, passed through untouched.
    #[error("Failed to generate content from external API.")]
    Upstream { details: Value },

    #[error("Internal server error: {0}")]
    Unexpected(String),
}

impl ProxyError {
    /// Upstream and unexpected failures are logged before responding; the
    /// caller-facing kinds are not.
    pub fn should_log(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Unexpected(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingPrompt => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Upstream { .. } | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();

        match self {
            // Plain text, not JSON.
            Self::MethodNotAllowed => (status, error).into_response(),
            Self::Upstream { details } => (
                status,
                Json(ErrorBody {
                    error,
                    details: Some(details),
                }),
            )
                .into_response(),
            _ => (status, Json(ErrorBody { error, details: None })).into_response(),
        }
    }
}

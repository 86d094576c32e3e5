//! Gemini `generateContent` client.
//!
//! Request types mirror the REST payload. Replies are read through
//! [`GenerateContentResponse`], which treats every link of
//! `candidates[0].content.parts[0].text` as optional so that partial or
//! unexpected shapes never fault.

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::UpstreamConfig;

/// Fixed persona sent with every request. Not user-controlled.
pub const SYSTEM_PROMPT: &str = "You are a professional fitness planner. Based on the user's goal, provide a structured, detailed, 7-day workout and diet plan. Format the response neatly using markdown.";

// ─── Request Types ─────────────────────────────────────────────────────────

/// Outbound `generateContent` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl GenerateContentRequest {
    /// Wrap a user prompt together with [`SYSTEM_PROMPT`].
    pub fn for_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::text(prompt)],
            system_instruction: Content::text(SYSTEM_PROMPT),
        }
    }
}

// ─── Response Types ────────────────────────────────────────────────────────

/// Read-only view of a `generateContent` reply.
///
/// Links are looked up on the raw JSON one at a time, so a malformed
/// sibling element (a `null` second candidate, say) never hides the first.
#[derive(Debug, Clone, Copy)]
pub struct GenerateContentResponse<'a> {
    body: &'a Value,
}

impl<'a> GenerateContentResponse<'a> {
    pub fn new(body: &'a Value) -> Self {
        Self { body }
    }

    /// True when `candidates` has a non-zero length. Arrays count by
    /// element, strings by character; anything else has no length.
    pub fn has_candidates(&self) -> bool {
        match self.body.get("candidates") {
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            _ => false,
        }
    }

    /// `candidates[0].content.parts[0].text`, if every link exists and the
    /// leaf is a non-empty string.
    pub fn generated_text(&self) -> Option<&'a str> {
        let body: &'a Value = self.body;
        body.get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
            .filter(|t| !t.is_empty())
    }
}

// ─── Client ────────────────────────────────────────────────────────────────

/// Status and parsed body of an upstream call.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Thin reqwest wrapper around the `generateContent` endpoint.
///
/// No timeout or retry is configured: a call waits until the upstream
/// answers or the connection fails.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the payload and parse the body as JSON regardless of status.
    ///
    /// Errors are stripped of their URL, which carries the API key.
    pub async fn generate_content(
        &self,
        api_key: &Secret<String>,
        request: &GenerateContentRequest,
    ) -> Result<UpstreamReply, reqwest::Error> {
        debug!(endpoint = %self.endpoint, "Sending request to Gemini API");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key.expose_secret())])
            .json(request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(reqwest::Error::without_url)?;

        debug!(status = status.as_u16(), "Gemini API responded");

        Ok(UpstreamReply { status, body })
    }
}

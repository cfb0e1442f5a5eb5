//! Generative text backend.
//!
//! One concrete implementation: the Google Gemini `generateContent` API with
//! the `google_search` grounding tool. The trait exists so the enrichment
//! stage and the chat session can be tested against a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String, // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub messages: Vec<Message>,
    /// Enables the web-search grounding tool for this call.
    pub enable_search: bool,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// A web source attached by the service as evidence for its claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingCitation {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub citations: Vec<GroundingCitation>,
    pub model: String,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, LlmError>;
    fn model_id(&self) -> &str;
}

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await?;
    if status >= 400 {
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(LlmError::ApiError { status, message: msg });
    }
    Ok(body)
}

// ── Google Gemini ─────────────────────────────────────────────────────────────

pub struct GeminiBackend {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        // System message → systemInstruction; assistant → "model" role.
        let system_text = req
            .messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.clone());

        let contents: Vec<serde_json::Value> = req
            .messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| {
                let role = if m.role == "assistant" { "model" } else { "user" };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": m.content }]
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": req.max_tokens.unwrap_or(8192),
                "temperature":     req.temperature.unwrap_or(0.2),
            }
        });
        if let Some(sys) = system_text {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": sys }] });
        }
        if req.enable_search {
            body["tools"] = serde_json::json!([ { "google_search": {} } ]);
        }

        let resp = self.client.post(&url).json(&body).send().await?;
        let json = check_response_status(resp).await?;

        // A candidate may carry several parts; join them in order.
        let content = json["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let citations = parse_grounding_citations(&json);

        Ok(GenerateResponse {
            content,
            citations,
            model: self.model.clone(),
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Extract grounding web sources from `groundingMetadata.groundingChunks`.
/// Absent metadata yields an empty list.
fn parse_grounding_citations(json: &serde_json::Value) -> Vec<GroundingCitation> {
    json["candidates"][0]["groundingMetadata"]["groundingChunks"]
        .as_array()
        .unwrap_or(&vec![])
        .iter()
        .filter_map(|chunk| {
            let uri = chunk["web"]["uri"].as_str()?;
            let title = chunk["web"]["title"].as_str().unwrap_or("").to_string();
            Some(GroundingCitation { uri: uri.to_string(), title })
        })
        .collect()
}

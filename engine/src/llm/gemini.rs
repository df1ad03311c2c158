//! Gemini Inference Gateway
//!
//! Implements [`InferenceGateway`] over the Gemini `generateContent` REST API.
//!
//! - Structured completions set `responseMimeType: application/json` and a
//!   `responseSchema`.
//! - Grounded completions enable the `googleSearch` tool and read citations
//!   from `groundingMetadata.groundingChunks`.
//! - The API key travels in the `x-goog-api-key` header and is scrubbed from
//!   any error text.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{
    parse_json_payload, GroundedCompletion, InferenceGateway, LLMError, ResponseSchema, Result,
};
use crate::config::GeminiConfig;
use crate::secrets::{scrub_secrets, SecretString};
use sdk::types::Source;

pub struct GeminiGateway {
    config: GeminiConfig,
    api_key: SecretString,
    client: Client,
}

impl GeminiGateway {
    /// Create a new Gemini gateway
    ///
    /// The request timeout comes from `config.timeout_secs`.
    pub fn new(config: GeminiConfig, api_key: SecretString) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build a single-turn request body
    fn request_body(prompt: &str) -> serde_json::Map<String, Value> {
        let mut payload = serde_json::Map::new();
        payload.insert(
            "contents".to_string(),
            json!([{ "role": "user", "parts": [{ "text": prompt }] }]),
        );
        payload
    }

    async fn generate(&self, payload: serde_json::Map<String, Value>) -> Result<Candidate> {
        tracing::debug!("POST {} (model {})", self.endpoint(), self.config.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.api_key.unsecure())
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = scrub_secrets(&response.text().await.unwrap_or_default());
            return Err(map_status_error(status, text));
        }

        let data: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(scrub_secrets(&e.to_string())))?;

        data.candidates
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ParseError("No candidates in response".to_string()))
    }
}

#[async_trait]
impl InferenceGateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete_text(&self, prompt: &str) -> Result<String> {
        let candidate = self.generate(Self::request_body(prompt)).await?;
        candidate.text()
    }

    async fn complete_structured(&self, prompt: &str, schema: &ResponseSchema) -> Result<Value> {
        let mut payload = Self::request_body(prompt);
        payload.insert(
            "generationConfig".to_string(),
            json!({
                "responseMimeType": "application/json",
                "responseSchema": schema.as_value(),
            }),
        );

        let candidate = self.generate(payload).await?;
        parse_json_payload(&candidate.text()?)
    }

    async fn complete_grounded(&self, prompt: &str) -> Result<GroundedCompletion> {
        let mut payload = Self::request_body(prompt);
        payload.insert("tools".to_string(), json!([{ "googleSearch": {} }]));

        let candidate = self.generate(payload).await?;
        let citations = candidate.citations();
        let text = candidate.text()?;

        Ok(GroundedCompletion { text, citations })
    }
}

fn map_transport_error(e: reqwest::Error) -> LLMError {
    if e.is_timeout() {
        LLMError::Timeout
    } else if e.is_connect() {
        LLMError::ProviderUnavailable(format!(
            "Cannot connect to Gemini API: {}",
            scrub_secrets(&e.to_string())
        ))
    } else {
        LLMError::NetworkError(scrub_secrets(&e.to_string()))
    }
}

fn map_status_error(status: StatusCode, text: String) -> LLMError {
    match status.as_u16() {
        400 | 404 => LLMError::InvalidRequest(text),
        401 | 403 => LLMError::AuthenticationFailed(text),
        429 => LLMError::RateLimitExceeded,
        _ => LLMError::ProviderUnavailable(format!("Gemini API error ({}): {}", status, text)),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,

    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl Candidate {
    /// Concatenated text of all parts
    fn text(&self) -> Result<String> {
        let parts = self
            .content
            .as_ref()
            .map(|c| c.parts.as_slice())
            .unwrap_or_default();

        if parts.iter().all(|p| p.text.is_none()) {
            return Err(LLMError::ParseError(
                "No text parts in candidate content".to_string(),
            ));
        }

        Ok(parts.iter().filter_map(|p| p.text.as_deref()).collect())
    }

    /// Web citations; chunks without a URI are skipped
    fn citations(&self) -> Vec<Source> {
        let Some(metadata) = &self.grounding_metadata else {
            return Vec::new();
        };

        metadata
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.clone()?;
                let title = web.title.clone().unwrap_or_else(|| uri.clone());
                Some(Source::new(title, uri))
            })
            .collect()
    }
}

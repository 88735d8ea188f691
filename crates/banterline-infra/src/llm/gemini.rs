//! Gemini model adapter.
//!
//! Implements `ModelProvider` against the `generateContent` endpoint.
//! The wire shapes are private: the rest of the system only sees
//! `PromptTurn` in and reply text (or `ModelError`) out. Call deadlines
//! are enforced by the engine, not here.

use banterline_core::llm::ModelProvider;
use banterline_types::config::ModelConfig;
use banterline_types::error::ModelError;
use banterline_types::turn::{ContentPart, PromptTurn};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Gemini `generateContent` client.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    system_prompt: String,
}

impl GeminiProvider {
    pub fn new(
        config: &ModelConfig,
        system_prompt: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            system_prompt: system_prompt.into(),
        }
    }

    fn request_body(&self, turns: &[PromptTurn]) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: WireContent {
                role: None,
                parts: vec![WirePart::text(self.system_prompt.clone())],
            },
            contents: turns.iter().map(WireContent::from_turn).collect(),
        }
    }
}

impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, turns: &[PromptTurn]) -> Result<String, ModelError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.request_body(turns))
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ModelError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Deserialization(e.to_string()))?;

        extract_text(body)
    }
}

/// Pull the reply text out of a response body.
fn extract_text(body: GenerateContentResponse) -> Result<String, ModelError> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ModelError::Empty);
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// Wire types (camelCase JSON per the REST API)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: WireContent,
    contents: Vec<WireContent>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<WirePart>,
}

impl WireContent {
    fn from_turn(turn: &PromptTurn) -> Self {
        Self {
            role: Some(turn.role.to_string()),
            parts: turn.parts.iter().map(WirePart::from_part).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireBlob>,
}

impl WirePart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn from_part(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text { text } => Self::text(text.clone()),
            ContentPart::Image { image } => Self {
                text: None,
                inline_data: Some(WireBlob {
                    mime_type: image.media_type.clone(),
                    data: image.data.clone(),
                }),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

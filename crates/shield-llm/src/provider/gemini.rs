//! Google Gemini `generateContent` client

use crate::cache::LLMCache;
use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::{http_client, send_json, with_cache, LLMProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.max_output_tokens.is_none()
            && self.temperature.is_none()
            && self.response_mime_type.is_none()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "GenerationConfig::is_empty")]
    generation_config: GenerationConfig,
}

impl<'a> From<&'a LLMRequest> for GenerateRequest<'a> {
    fn from(request: &'a LLMRequest) -> Self {
        Self {
            contents: [Content {
                role: Some("user"),
                parts: [Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: request.system.as_deref().map(|system| Content {
                role: None,
                parts: [Part { text: system }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
                response_mime_type: request.json_mode.then_some("application/json"),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u32,
}

/// Client for Gemini models. The key travels as a `key` query parameter.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    cache: Option<Arc<dyn LLMCache>>,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            cache: None,
            client: http_client(),
        }
    }

    pub fn cached(mut self, cache: Arc<dyn LLMCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let reply: GenerateResponse = send_json(
            "Gemini",
            self.client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&GenerateRequest::from(&request)),
        )
        .await?;

        let candidate = reply
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::InvalidResponse("Gemini returned no candidates".to_string()))?;

        // a candidate blocked by safety filters carries no text parts
        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.is_empty() {
            return Err(LLMError::InvalidResponse(format!(
                "Gemini candidate has no text (finish reason {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        let tokens = reply
            .usage_metadata
            .map_or(0, |usage| usage.total_token_count);

        Ok(LLMResponse::new(text, request.model)
            .with_tokens(tokens)
            .with_finish_reason(candidate.finish_reason.unwrap_or_else(|| "STOP".to_string())))
    }
}

#[async_trait]
impl LLMClient for GeminiProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        with_cache(self.cache.as_ref(), request, |request| self.generate(request)).await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

impl LLMProvider for GeminiProvider {
    fn provider_name(&self) -> &str {
        "Gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = LLMRequest::new("Assess shady-shop.com", "gemini-1.5-flash")
            .with_system("You are a fraud analyst")
            .with_json_mode();

        let body = serde_json::to_value(GenerateRequest::from(&request)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Assess shady-shop.com");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a fraud analyst"
        );
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_plain_request_omits_generation_config() {
        let request = LLMRequest::new("Assess example.com", "gemini-1.5-flash");
        let body = serde_json::to_value(GenerateRequest::from(&request)).unwrap();

        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }
}

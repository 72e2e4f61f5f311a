//! Anthropic Messages API client

use crate::cache::LLMCache;
use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::{http_client, send_json, with_cache, LLMProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The Messages API rejects requests without a token limit
const FALLBACK_MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> From<&'a LLMRequest> for MessagesRequest<'a> {
    fn from(request: &'a LLMRequest) -> Self {
        Self {
            model: &request.model,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            system: request.system.as_deref(),
            temperature: request.temperature,
        }
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Client for Claude models.
///
/// The API has no JSON switch, so `json_mode` relies on the prompt asking for JSON.
pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    cache: Option<Arc<dyn LLMCache>>,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, ANTHROPIC_BASE_URL)
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

    async fn send_messages(&self, request: LLMRequest) -> Result<LLMResponse> {
        let reply: MessagesResponse = send_json(
            "Anthropic",
            self.client
                .post(format!("{}/messages", self.base_url))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&MessagesRequest::from(&request)),
        )
        .await?;

        let text: String = reply
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();
        if text.is_empty() {
            return Err(LLMError::InvalidResponse(
                "Anthropic reply has no text blocks".to_string(),
            ));
        }

        Ok(LLMResponse::new(text, request.model)
            .with_tokens(reply.usage.input_tokens + reply.usage.output_tokens)
            .with_finish_reason(reply.stop_reason.unwrap_or_else(|| "end_turn".to_string())))
    }
}

#[async_trait]
impl LLMClient for AnthropicProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        with_cache(self.cache.as_ref(), request, |request| {
            self.send_messages(request)
        })
        .await
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

impl LLMProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_token_limit() {
        let request = LLMRequest::new("Assess shady-shop.com", "claude-3-5-haiku-latest");
        let body = serde_json::to_value(MessagesRequest::from(&request)).unwrap();

        assert_eq!(body["max_tokens"], FALLBACK_MAX_TOKENS);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("system").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_non_text_blocks_are_skipped() {
        let reply: MessagesResponse = serde_json::from_str(
            r#"{
                "content": [
                    {"type": "tool_use", "id": "t1", "name": "whois", "input": {}},
                    {"type": "text", "text": "Registered last week."}
                ],
                "stop_reason": "end_turn"
            }"#,
        )
        .unwrap();

        let texts: Vec<_> = reply
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();
        assert_eq!(texts, vec!["Registered last week."]);
        assert_eq!(reply.usage.input_tokens, 0);
    }
}

//! OpenAI provider implementation

use crate::cache::LLMCache;
use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::{http_client, send_json, with_cache, LLMProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completions provider
pub struct OpenAIProvider {
    api_key: String,
    base_url: String,
    cache: Option<Arc<dyn LLMCache>>,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    /// Create with custom base URL (e.g., for Azure OpenAI or a proxy)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            cache: None,
            client: http_client(),
        }
    }

    /// Attach a response cache
    pub fn cached(mut self, cache: Arc<dyn LLMCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Call an OpenAI-compatible `/chat/completions` endpoint
pub(crate) async fn chat_completion(
    client: &Client,
    provider: &str,
    base_url: &str,
    api_key: &str,
    request: &LLMRequest,
) -> Result<LLMResponse> {
    let mut messages = Vec::new();
    if let Some(system) = &request.system {
        messages.push(json!({
            "role": "system",
            "content": system
        }));
    }
    messages.push(json!({
        "role": "user",
        "content": request.prompt
    }));

    let mut body = json!({
        "model": request.model,
        "messages": messages,
    });

    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    if request.json_mode {
        body["response_format"] = json!({ "type": "json_object" });
    }

    let resp_json: serde_json::Value = send_json(
        provider,
        client
            .post(format!("{}/chat/completions", base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body),
    )
    .await?;

    let content = resp_json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LLMError::InvalidResponse("No content in response".to_string()))?
        .to_string();

    let finish_reason = resp_json["choices"][0]["finish_reason"]
        .as_str()
        .unwrap_or("stop")
        .to_string();

    let tokens_used = resp_json["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32;

    Ok(LLMResponse::new(content, request.model.clone())
        .with_tokens(tokens_used)
        .with_finish_reason(finish_reason))
}

#[async_trait]
impl LLMClient for OpenAIProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        with_cache(self.cache.as_ref(), request, |request| async move {
            chat_completion(&self.client, "OpenAI", &self.base_url, &self.api_key, &request)
                .await
        })
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

impl LLMProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

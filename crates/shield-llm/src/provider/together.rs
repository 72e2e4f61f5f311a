//! Together AI provider (OpenAI-compatible API)

use crate::cache::LLMCache;
use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::Result;
use crate::provider::openai::chat_completion;
use crate::provider::{http_client, with_cache, LLMProvider};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

const TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";

/// Together AI provider for hosted open-weight models
pub struct TogetherProvider {
    api_key: String,
    base_url: String,
    cache: Option<Arc<dyn LLMCache>>,
    client: Client,
}

impl TogetherProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, TOGETHER_BASE_URL)
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
}

#[async_trait]
impl LLMClient for TogetherProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        with_cache(self.cache.as_ref(), request, |request| async move {
            chat_completion(&self.client, "Together", &self.base_url, &self.api_key, &request)
                .await
        })
        .await
    }

    fn name(&self) -> &str {
        "together"
    }
}

impl LLMProvider for TogetherProvider {
    fn provider_name(&self) -> &str {
        "Together"
    }
}

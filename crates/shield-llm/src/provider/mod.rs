//! LLM provider implementations

use crate::cache::LLMCache;
use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{classify_status, LLMError, Result};
use crate::router::ProviderKind;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// LLM provider trait
pub trait LLMProvider: LLMClient {
    /// Get the provider name
    fn provider_name(&self) -> &str;
}

mod anthropic;
mod gemini;
mod mock;
mod openai;
mod together;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai::OpenAIProvider;
pub use together::TogetherProvider;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP client shared by the providers, with a request timeout
pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a prepared request and parse the JSON body, classifying failures
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T> {
    let resp = request.send().await.map_err(|e| {
        if e.is_timeout() {
            LLMError::Timeout(format!("{} API call timed out: {}", provider, e))
        } else {
            LLMError::ApiCallFailed(format!("{} API call failed: {}", provider, e))
        }
    })?;

    let status = resp.status();
    let resp_text = resp
        .text()
        .await
        .map_err(|e| LLMError::ApiCallFailed(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(classify_status(provider, status, &resp_text));
    }

    serde_json::from_str(&resp_text)
        .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Answers from `cache` when it holds the request, otherwise runs `fetch` and stores the result
pub(crate) async fn with_cache<F, Fut>(
    cache: Option<&Arc<dyn LLMCache>>,
    request: LLMRequest,
    fetch: F,
) -> Result<LLMResponse>
where
    F: FnOnce(LLMRequest) -> Fut,
    Fut: Future<Output = Result<LLMResponse>>,
{
    let Some(cache) = cache else {
        return fetch(request).await;
    };
    if let Some(hit) = cache.get(&request).await {
        return Ok(hit);
    }

    let response = fetch(request.clone()).await?;
    cache.set(request, response.clone()).await;
    Ok(response)
}

/// Build a client for `kind`, optionally against a custom base URL
pub fn create_client(
    kind: ProviderKind,
    api_key: impl Into<String>,
    base_url: Option<&str>,
    cache: Option<Arc<dyn LLMCache>>,
) -> Arc<dyn LLMClient> {
    let api_key = api_key.into();

    macro_rules! build {
        ($provider:ty) => {{
            let provider = match base_url {
                Some(url) => <$provider>::with_base_url(api_key, url),
                None => <$provider>::new(api_key),
            };
            match cache {
                Some(cache) => Arc::new(provider.cached(cache)) as Arc<dyn LLMClient>,
                None => Arc::new(provider) as Arc<dyn LLMClient>,
            }
        }};
    }

    match kind {
        ProviderKind::OpenAI => build!(OpenAIProvider),
        ProviderKind::Anthropic => build!(AnthropicProvider),
        ProviderKind::Gemini => build!(GeminiProvider),
        ProviderKind::Together => build!(TogetherProvider),
        ProviderKind::Mock => Arc::new(MockProvider::new()),
    }
}

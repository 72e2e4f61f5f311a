//! Provider tests against mocked vendor endpoints
//!
//! These tests use mockito to stand in for the hosted LLM APIs.

use mockito::{Matcher, Server};
use shield_llm::{
    AnthropicProvider, GeminiProvider, InMemoryLLMCache, LLMClient, LLMError, LLMRequest,
    OpenAIProvider, TogetherProvider,
};
use std::sync::Arc;

const OPENAI_OK: &str = r#"{
    "choices": [{
        "message": {"role": "assistant", "content": "{\"risk_score\": 80}"},
        "finish_reason": "stop"
    }],
    "usage": {"total_tokens": 42}
}"#;

#[tokio::test]
async fn test_openai_chat_completion() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJsonString(
            r#"{"model": "gpt-4o-mini", "response_format": {"type": "json_object"}}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(OPENAI_OK)
        .create_async()
        .await;

    let provider = OpenAIProvider::with_base_url("sk-test", server.url());
    let response = provider
        .call(LLMRequest::new("Assess example.com", "gpt-4o-mini").with_json_mode())
        .await
        .unwrap();

    assert_eq!(response.content, r#"{"risk_score": 80}"#);
    assert_eq!(response.tokens_used, 42);
    assert_eq!(response.finish_reason, "stop");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_unauthorized() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "invalid api key"}}"#)
        .create_async()
        .await;

    let provider = OpenAIProvider::with_base_url("bad-key", server.url());
    let err = provider
        .call(LLMRequest::new("hello", "gpt-4o-mini"))
        .await
        .unwrap_err();

    assert!(matches!(err, LLMError::Unauthorized(_)));
}

#[tokio::test]
async fn test_rate_limited_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("slow down")
        .expect(1)
        .create_async()
        .await;

    let provider = TogetherProvider::with_base_url("key", server.url());
    let err = provider
        .call(LLMRequest::new("hello", "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo"))
        .await
        .unwrap_err();

    assert!(matches!(err, LLMError::RateLimited(ref p) if p == "Together"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_content_is_invalid_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let provider = OpenAIProvider::with_base_url("key", server.url());
    let err = provider
        .call(LLMRequest::new("hello", "gpt-4o"))
        .await
        .unwrap_err();

    assert!(matches!(err, LLMError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_anthropic_messages() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .match_header("x-api-key", "ak-test")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJsonString(
            r#"{"system": "You are a fraud analyst"}"#.to_string(),
        ))
        .with_status(200)
        .with_body(
            r#"{
                "content": [
                    {"type": "text", "text": "Domain registered "},
                    {"type": "text", "text": "three days ago."}
                ],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 20, "output_tokens": 7}
            }"#,
        )
        .create_async()
        .await;

    let provider = AnthropicProvider::with_base_url("ak-test", server.url());
    let response = provider
        .call(
            LLMRequest::new("Assess example.com", "claude-3-5-haiku-latest")
                .with_system("You are a fraud analyst"),
        )
        .await
        .unwrap();

    assert_eq!(response.content, "Domain registered three days ago.");
    assert_eq!(response.tokens_used, 27);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_gemini_generate_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-1.5-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "gk-test".into()))
        .with_status(200)
        .with_body(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "Low risk."}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"totalTokenCount": 15}
            }"#,
        )
        .create_async()
        .await;

    let provider = GeminiProvider::with_base_url("gk-test", server.url());
    let response = provider
        .call(LLMRequest::new("Assess example.com", "gemini-1.5-flash"))
        .await
        .unwrap();

    assert_eq!(response.content, "Low risk.");
    assert_eq!(response.tokens_used, 15);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cache_hit_skips_second_call() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(OPENAI_OK)
        .expect(1)
        .create_async()
        .await;

    let cache = Arc::new(InMemoryLLMCache::new());
    let provider = OpenAIProvider::with_base_url("key", server.url()).cached(cache.clone());
    let request = LLMRequest::new("Assess example.com", "gpt-4o-mini");

    let first = provider.call(request.clone()).await.unwrap();
    let second = provider.call(request).await.unwrap();

    assert_eq!(first.content, second.content);
    assert_eq!(cache.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_gemini_blocked_candidate_is_invalid_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/models/gemini-1.5-flash:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)
        .create_async()
        .await;

    let provider = GeminiProvider::with_base_url("gk-test", server.url());
    let err = provider
        .call(LLMRequest::new("Assess example.com", "gemini-1.5-flash"))
        .await
        .unwrap_err();

    assert!(matches!(err, LLMError::InvalidResponse(ref msg) if msg.contains("SAFETY")));
}

#[tokio::test]
async fn test_anthropic_answers_are_cached() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .with_status(200)
        .with_body(
            r#"{
                "content": [{"type": "text", "text": "Looks like a clone shop."}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 6}
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let cache = Arc::new(InMemoryLLMCache::new());
    let provider = AnthropicProvider::with_base_url("ak-test", server.url()).cached(cache.clone());
    let request = LLMRequest::new("Assess shady-shop.com", "claude-3-5-haiku-latest");

    let first = provider.call(request.clone()).await.unwrap();
    let second = provider.call(request).await.unwrap();

    assert_eq!(first.content, "Looks like a clone shop.");
    assert_eq!(second.tokens_used, 18);
    mock.assert_async().await;
}

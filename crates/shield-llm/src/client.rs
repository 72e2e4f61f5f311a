//! LLM client interface and types

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request to an LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMRequest {
    /// The prompt to send to the LLM
    pub prompt: String,

    /// Model identifier (e.g., "gpt-4o-mini", "claude-3-5-sonnet-latest")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 1.0)
    pub temperature: Option<f32>,

    /// System message/instructions
    pub system: Option<String>,

    /// Ask the provider to return a JSON object
    pub json_mode: bool,
}

impl LLMRequest {
    /// Create a new LLM request
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: None,
            temperature: None,
            system: None,
            json_mode: false,
        }
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set system message
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Request JSON output
    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Response from an LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Number of tokens used
    pub tokens_used: u32,

    /// Finish reason (e.g., "stop", "length")
    pub finish_reason: String,
}

impl LLMResponse {
    /// Create a new LLM response
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            tokens_used: 0,
            finish_reason: "stop".to_string(),
        }
    }

    /// Set tokens used
    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens_used = tokens;
        self
    }

    /// Set finish reason
    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = reason.into();
        self
    }
}

/// Async LLM client trait
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Call the LLM with a request for text generation
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse>;

    /// Get the name of this client
    fn name(&self) -> &str;
}

/// Extract the first balanced `{...}` JSON object from a completion
///
/// Models like to wrap JSON in markdown fences or prose.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_request_builder() {
        let request = LLMRequest::new("Test prompt", "gpt-4o-mini")
            .with_max_tokens(100)
            .with_temperature(0.7)
            .with_system("You are a fraud analyst")
            .with_json_mode();

        assert_eq!(request.prompt, "Test prompt");
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.system.as_deref(), Some("You are a fraud analyst"));
        assert!(request.json_mode);
    }

    #[test]
    fn test_llm_response_builder() {
        let response = LLMResponse::new("Generated text", "gpt-4o-mini")
            .with_tokens(50)
            .with_finish_reason("length");

        assert_eq!(response.content, "Generated text");
        assert_eq!(response.tokens_used, 50);
        assert_eq!(response.finish_reason, "length");
    }

    #[test]
    fn test_extract_json_block_from_fence() {
        let text = "Here you go:\n```json\n{\"risk_score\": 80, \"notes\": \"uses {braces}\"}\n```";
        assert_eq!(
            extract_json_block(text),
            Some("{\"risk_score\": 80, \"notes\": \"uses {braces}\"}")
        );
    }

    #[test]
    fn test_extract_json_block_nested() {
        let text = r#"{"a": {"b": [1, 2]}, "c": "\"}"} trailing"#;
        assert_eq!(extract_json_block(text), Some(r#"{"a": {"b": [1, 2]}, "c": "\"}"}"#));
    }

    #[test]
    fn test_extract_json_block_missing() {
        assert_eq!(extract_json_block("no json here"), None);
        assert_eq!(extract_json_block("{ unterminated"), None);
    }
}

//! Scripted analyst for offline runs and tests

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::LLMProvider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

const DEFAULT_ANSWER: &str = "Mock LLM response";

enum Script {
    /// Answers are handed out in order; the last one repeats
    Answers(VecDeque<String>),
    Fail(String),
}

/// Offline [`LLMClient`] that replays scripted answers and records every request.
pub struct MockProvider {
    script: Mutex<Script>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_response(DEFAULT_ANSWER)
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self::with_responses([response.into()])
    }

    /// Replays `responses` one per call, then keeps repeating the last
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut answers: VecDeque<String> = responses.into_iter().map(Into::into).collect();
        if answers.is_empty() {
            answers.push_back(DEFAULT_ANSWER.to_string());
        }
        Self::scripted(Script::Answers(answers))
    }

    /// Every call returns `ApiCallFailed(message)`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::scripted(Script::Fail(message.into()))
    }

    fn scripted(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    fn next_answer(&self) -> Result<String> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| LLMError::ApiCallFailed("mock script poisoned".to_string()))?;
        match &mut *script {
            Script::Fail(message) => Err(LLMError::ApiCallFailed(message.clone())),
            Script::Answers(answers) if answers.len() > 1 => {
                Ok(answers.pop_front().unwrap_or_default())
            }
            Script::Answers(answers) => Ok(answers.front().cloned().unwrap_or_default()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        let answer = self.next_answer()?;
        Ok(LLMResponse::new(answer, request.model)
            .with_tokens(10)
            .with_finish_reason("stop"))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

impl LLMProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "Mock"
    }
}

//! Memoised analyst answers
//!
//! A storefront can change owners or get taken down within hours, so cached
//! answers expire instead of living for the whole process.

use crate::client::{LLMRequest, LLMResponse};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Storage for answers keyed by the full request
#[async_trait]
pub trait LLMCache: Send + Sync {
    async fn get(&self, request: &LLMRequest) -> Option<LLMResponse>;

    async fn set(&self, request: LLMRequest, response: LLMResponse);

    /// Drops every stored answer
    async fn clear(&self);
}

/// Everything that changes what a model would answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RequestKey {
    model: String,
    system: Option<String>,
    prompt: String,
    max_tokens: Option<u32>,
    temperature_bits: Option<u32>,
    json_mode: bool,
}

impl From<&LLMRequest> for RequestKey {
    fn from(request: &LLMRequest) -> Self {
        Self {
            model: request.model.clone(),
            system: request.system.clone(),
            prompt: request.prompt.clone(),
            max_tokens: request.max_tokens,
            temperature_bits: request.temperature.map(f32::to_bits),
            json_mode: request.json_mode,
        }
    }
}

struct Stored {
    response: LLMResponse,
    stored_at: Instant,
}

/// Process-local cache backed by a concurrent map.
///
/// Expired entries are dropped lazily when they are looked up.
pub struct InMemoryLLMCache {
    entries: DashMap<RequestKey, Stored>,
    ttl: Duration,
}

impl InMemoryLLMCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored answers, expired ones included until they are touched
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryLLMCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMCache for InMemoryLLMCache {
    async fn get(&self, request: &LLMRequest) -> Option<LLMResponse> {
        let key = RequestKey::from(request);
        match self.entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.response.clone())
            }
            Some(_) => {}
            None => return None,
        }
        // the read guard is released before removal; holding it would deadlock the shard
        self.entries.remove(&key);
        None
    }

    async fn set(&self, request: LLMRequest, response: LLMResponse) {
        self.entries.insert(
            RequestKey::from(&request),
            Stored {
                response,
                stored_at: Instant::now(),
            },
        );
    }

    async fn clear(&self) {
        self.entries.clear();
    }
}

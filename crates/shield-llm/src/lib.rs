//! ScamShield LLM Integration
//!
//! Thin clients for the hosted LLM vendors the investigation stage can use
//! as an analyst, a response cache, and a static model catalog with a
//! weighted router for picking a model per task.
//!
//! **Note**: LLM calls take seconds. They run inside the investigation stage
//! of an order, never on a request path that needs a fast answer.

pub use cache::{InMemoryLLMCache, LLMCache};
pub use client::{extract_json_block, LLMClient, LLMRequest, LLMResponse};
pub use error::{LLMError, Result};

pub use provider::{
    create_client, AnthropicProvider, GeminiProvider, LLMProvider, MockProvider, OpenAIProvider,
    TogetherProvider,
};
pub use router::{catalog, ModelProfile, ModelRouter, ProviderKind, TaskProfile};

pub mod cache;
pub mod client;
pub mod error;
pub mod provider;
pub mod router;

//! Model selection
//!
//! A static catalog of models with their cost and rough quality/speed ratings.
//! [`ModelRouter`] scores each available model for a task with a weighted sum
//! and returns the best match.

use crate::error::{LLMError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Hosted LLM vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Gemini,
    Together,
    Mock,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Together => "together",
            ProviderKind::Mock => "mock",
        };
        f.write_str(s)
    }
}

impl FromStr for ProviderKind {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "together" => Ok(ProviderKind::Together),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(LLMError::InvalidConfiguration(format!(
                "Unknown LLM provider: {}",
                other
            ))),
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelProfile {
    pub provider: ProviderKind,
    pub model: &'static str,
    /// USD per 1k tokens (blended input/output)
    pub cost_per_1k_tokens: f64,
    /// 0.0 - 1.0
    pub quality: f64,
    /// 0.0 - 1.0, higher is faster
    pub speed: f64,
}

const CATALOG: &[ModelProfile] = &[
    ModelProfile {
        provider: ProviderKind::OpenAI,
        model: "gpt-4o",
        cost_per_1k_tokens: 0.0075,
        quality: 0.92,
        speed: 0.70,
    },
    ModelProfile {
        provider: ProviderKind::OpenAI,
        model: "gpt-4o-mini",
        cost_per_1k_tokens: 0.0004,
        quality: 0.78,
        speed: 0.90,
    },
    ModelProfile {
        provider: ProviderKind::Anthropic,
        model: "claude-3-5-sonnet-latest",
        cost_per_1k_tokens: 0.0090,
        quality: 0.94,
        speed: 0.65,
    },
    ModelProfile {
        provider: ProviderKind::Anthropic,
        model: "claude-3-5-haiku-latest",
        cost_per_1k_tokens: 0.0024,
        quality: 0.80,
        speed: 0.88,
    },
    ModelProfile {
        provider: ProviderKind::Gemini,
        model: "gemini-1.5-pro",
        cost_per_1k_tokens: 0.0044,
        quality: 0.88,
        speed: 0.68,
    },
    ModelProfile {
        provider: ProviderKind::Gemini,
        model: "gemini-1.5-flash",
        cost_per_1k_tokens: 0.0002,
        quality: 0.74,
        speed: 0.95,
    },
    ModelProfile {
        provider: ProviderKind::Together,
        model: "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
        cost_per_1k_tokens: 0.0009,
        quality: 0.82,
        speed: 0.80,
    },
];

/// The built-in model catalog
pub fn catalog() -> &'static [ModelProfile] {
    CATALOG
}

/// Weights for scoring models against a task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskProfile {
    pub quality_weight: f64,
    pub speed_weight: f64,
    pub cost_weight: f64,
}

impl TaskProfile {
    pub fn new(quality_weight: f64, speed_weight: f64, cost_weight: f64) -> Self {
        Self {
            quality_weight,
            speed_weight,
            cost_weight,
        }
    }

    /// Deep analysis where accuracy dominates
    pub fn analysis() -> Self {
        Self::new(0.7, 0.1, 0.2)
    }

    /// Short summaries where cost matters most
    pub fn summary() -> Self {
        Self::new(0.3, 0.3, 0.4)
    }
}

/// Picks a model from the catalog for a task
pub struct ModelRouter {
    models: Vec<ModelProfile>,
}

impl ModelRouter {
    /// Route over the whole catalog
    pub fn new() -> Self {
        Self {
            models: CATALOG.to_vec(),
        }
    }

    /// Route only over models from configured providers
    pub fn for_providers(providers: &[ProviderKind]) -> Self {
        let allowed: HashSet<&ProviderKind> = providers.iter().collect();
        Self {
            models: CATALOG
                .iter()
                .filter(|m| allowed.contains(&m.provider))
                .cloned()
                .collect(),
        }
    }

    fn max_cost(&self) -> f64 {
        self.models
            .iter()
            .map(|m| m.cost_per_1k_tokens)
            .fold(0.0, f64::max)
    }

    /// Weighted score of one model for a task
    pub fn score(&self, model: &ModelProfile, task: &TaskProfile) -> f64 {
        let max_cost = self.max_cost();
        let cost_score = if max_cost > 0.0 {
            1.0 - model.cost_per_1k_tokens / max_cost
        } else {
            1.0
        };

        model.quality * task.quality_weight
            + model.speed * task.speed_weight
            + cost_score * task.cost_weight
    }

    /// Best model for the task
    pub fn select(&self, task: &TaskProfile) -> Result<&ModelProfile> {
        self.models
            .iter()
            .map(|m| (m, self.score(m, task)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(m, _)| m)
            .ok_or_else(|| {
                LLMError::InvalidConfiguration("No models available for routing".to_string())
            })
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new()
    }
}

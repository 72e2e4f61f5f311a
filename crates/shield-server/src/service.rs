//! Order service initialization
//!
//! Turns the server configuration into a ready [`OrderProcessingService`],
//! choosing the investigator the configuration asks for.

use crate::config::{InvestigatorKind, ServerConfig};
use anyhow::Result;
use shield_llm::{create_client, InMemoryLLMCache, LLMCache, ModelRouter, TaskProfile};
use shield_runtime::{CannedInvestigator, IntelInvestigator, Investigator, LlmInvestigator};
use shield_sdk::{OrderProcessingService, OrderServiceBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Initialize the order processing service
pub fn init_service(config: &ServerConfig) -> Result<OrderProcessingService> {
    let investigator = build_investigator(config)?;
    info!(investigator = investigator.name(), "Investigator configured");

    std::fs::create_dir_all(&config.reports_dir).map_err(|e| {
        anyhow::anyhow!(
            "Cannot create reports directory {}: {}",
            config.reports_dir.display(),
            e
        )
    })?;

    Ok(OrderServiceBuilder::new()
        .with_config(config.service_config())
        .with_investigator(investigator)
        .build())
}

fn build_investigator(config: &ServerConfig) -> Result<Arc<dyn Investigator>> {
    match config.investigator {
        InvestigatorKind::Canned => Ok(Arc::new(CannedInvestigator::new())),
        InvestigatorKind::Intel => {
            let sources = config.resolved_intel_sources()?;
            if sources.is_empty() {
                return Err(anyhow::anyhow!(
                    "investigator = intel requires at least one entry in intel_sources"
                ));
            }
            info!(sources = sources.len(), "Intelligence sources loaded");
            Ok(Arc::new(IntelInvestigator::new(sources)))
        }
        InvestigatorKind::Llm => {
            let settings = config
                .llm
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("investigator = llm requires an llm section"))?;

            let model = match &settings.model {
                Some(model) => model.clone(),
                None => ModelRouter::for_providers(&[settings.provider])
                    .select(&TaskProfile::analysis())?
                    .model
                    .to_string(),
            };

            let cache: Option<Arc<dyn LLMCache>> = if settings.cache {
                Some(Arc::new(InMemoryLLMCache::with_ttl(Duration::from_secs(
                    settings.cache_ttl_minutes * 60,
                ))))
            } else {
                None
            };
            let client = create_client(
                settings.provider,
                settings.api_key.clone(),
                settings.base_url.as_deref(),
                cache,
            );

            info!(provider = %settings.provider, model = %model, "Analyst model configured");
            Ok(Arc::new(LlmInvestigator::new(client, model)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IntelSourceSetting, LlmSettings};
    use shield_llm::ProviderKind;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> ServerConfig {
        ServerConfig {
            reports_dir: dir.path().join("reports"),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_default_uses_canned_investigator() {
        let dir = TempDir::new().unwrap();
        let service = init_service(&config_in(&dir)).unwrap();
        assert_eq!(service.investigator_name(), "canned");
        assert!(dir.path().join("reports").is_dir());
    }

    #[test]
    fn test_intel_without_sources_fails() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            investigator: InvestigatorKind::Intel,
            ..config_in(&dir)
        };
        assert!(init_service(&config).is_err());
    }

    #[test]
    fn test_intel_with_preset() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            investigator: InvestigatorKind::Intel,
            intel_sources: vec![IntelSourceSetting::Preset {
                preset: "ipinfo".to_string(),
                api_key: "token".to_string(),
            }],
            ..config_in(&dir)
        };
        let service = init_service(&config).unwrap();
        assert_eq!(service.investigator_name(), "intel");
    }

    #[test]
    fn test_llm_requires_settings() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            investigator: InvestigatorKind::Llm,
            ..config_in(&dir)
        };
        assert!(init_service(&config).is_err());

        let config = ServerConfig {
            investigator: InvestigatorKind::Llm,
            llm: Some(LlmSettings {
                provider: ProviderKind::OpenAI,
                api_key: "sk-test".to_string(),
                model: None,
                base_url: None,
                cache: true,
                cache_ttl_minutes: 15,
            }),
            ..config_in(&dir)
        };
        let service = init_service(&config).unwrap();
        assert_eq!(service.investigator_name(), "llm");
    }
}

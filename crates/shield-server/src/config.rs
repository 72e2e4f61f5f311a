//! Server configuration

use serde::{Deserialize, Serialize};
use shield_llm::ProviderKind;
use shield_runtime::IntelSource;
use shield_sdk::ServiceConfig;
use std::fmt;
use std::path::PathBuf;

/// Which investigator runs the investigation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvestigatorKind {
    /// Built-in catalogue, no external calls
    #[default]
    Canned,
    /// External intelligence APIs from `intel_sources`
    Intel,
    /// Analyst model from the `llm` section
    Llm,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Analyst model settings
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: ProviderKind,

    #[serde(default)]
    pub api_key: String,

    /// Model name; picked by the router when unset
    #[serde(default)]
    pub model: Option<String>,

    /// Override the provider endpoint (proxies, self-hosted gateways)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Cache identical prompts in memory
    #[serde(default = "default_true")]
    pub cache: bool,

    /// How long a cached answer stays valid
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl_minutes() -> u64 {
    60
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("api_key", &REDACTED)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("cache", &self.cache)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .finish()
    }
}

/// An intelligence source, either a built-in preset or a full definition
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntelSourceSetting {
    Preset { preset: String, api_key: String },
    Custom(IntelSource),
}

impl fmt::Debug for IntelSourceSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntelSourceSetting::Preset { preset, .. } => f
                .debug_struct("Preset")
                .field("preset", preset)
                .field("api_key", &REDACTED)
                .finish(),
            IntelSourceSetting::Custom(source) => f.debug_tuple("Custom").field(source).finish(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    pub log_format: LogFormat,

    /// Base URL customers reach the API on, used in download links
    pub public_base_url: String,

    /// Where rendered reports are stored
    pub reports_dir: PathBuf,

    /// Lifetime of download links in hours
    pub download_ttl_hours: i64,

    pub investigator: InvestigatorKind,

    pub llm: Option<LlmSettings>,

    pub intel_sources: Vec<IntelSourceSetting>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            public_base_url: service.public_base_url,
            reports_dir: service.reports_dir,
            download_ttl_hours: service.download_ttl_hours,
            investigator: InvestigatorKind::Canned,
            llm: None,
            intel_sources: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config file
    ///
    /// Sources, later ones winning: defaults, `config/server.{yaml,toml,json}`,
    /// `SCAMSHIELD_*` environment variables (`__` separates nested keys, e.g.
    /// `SCAMSHIELD_LLM__API_KEY`).
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        Self::load_from("config/server")
    }

    /// Load from a specific config file (extension optional) plus the environment
    ///
    /// A missing file is fine; a file that exists but cannot be parsed is an error.
    pub fn load_from(file: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("SCAMSHIELD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", file, e))?;

        config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))
    }

    /// Settings handed to the order processing service
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            public_base_url: self.public_base_url.clone(),
            reports_dir: self.reports_dir.clone(),
            download_ttl_hours: self.download_ttl_hours,
            ..ServiceConfig::default()
        }
    }

    /// Resolve `intel_sources` into concrete source definitions
    pub fn resolved_intel_sources(&self) -> anyhow::Result<Vec<IntelSource>> {
        self.intel_sources
            .iter()
            .map(|setting| match setting {
                IntelSourceSetting::Preset { preset, api_key } => {
                    IntelSource::preset(preset, api_key.clone())
                        .ok_or_else(|| anyhow::anyhow!("Unknown intelligence preset: {}", preset))
                }
                IntelSourceSetting::Custom(source) => Ok(source.clone()),
            })
            .collect()
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> String {
        format!(
            "shield_server={level},shield_sdk={level},shield_runtime={level},shield_llm={level},tower_http=debug",
            level = self.log_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // serializes tests that read SCAMSHIELD_* variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.investigator, InvestigatorKind::Canned);
        assert!(config.llm.is_none());
        assert!(config.intel_sources.is_empty());
    }

    #[test]
    fn test_service_config_mapping() {
        let config = ServerConfig {
            public_base_url: "https://api.scamshield.example".to_string(),
            download_ttl_hours: 24,
            ..ServerConfig::default()
        };

        let service = config.service_config();
        assert_eq!(service.public_base_url, "https://api.scamshield.example");
        assert_eq!(service.download_ttl_hours, 24);
    }

    #[test]
    fn test_default_log_filter() {
        let config = ServerConfig {
            log_level: "debug".to_string(),
            ..ServerConfig::default()
        };
        let filter = config.default_log_filter();
        assert!(filter.contains("shield_sdk=debug"));
        assert!(filter.contains("tower_http=debug"));
    }

    #[test]
    fn test_intel_source_settings() {
        let yaml = serde_json::json!({
            "investigator": "intel",
            "intel_sources": [
                {"preset": "shodan", "api_key": "k1"},
                {
                    "name": "internal",
                    "base_url": "http://intel.local",
                    "path": "/v1/check/{target}",
                    "auth": {"type": "bearer"},
                    "api_key": "k2",
                    "supports": ["domain", "email"]
                }
            ]
        });

        let config: ServerConfig = serde_json::from_value(yaml).unwrap();
        assert_eq!(config.investigator, InvestigatorKind::Intel);

        let sources = config.resolved_intel_sources().unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "shodan");
        assert_eq!(sources[1].name, "internal");
        assert_eq!(sources[1].timeout_ms, 5_000);
    }

    #[test]
    fn test_unknown_preset_is_error() {
        let config = ServerConfig {
            intel_sources: vec![IntelSourceSetting::Preset {
                preset: "nope".to_string(),
                api_key: "k".to_string(),
            }],
            ..ServerConfig::default()
        };
        assert!(config.resolved_intel_sources().is_err());
    }

    #[test]
    fn test_env_overrides_use_single_underscore_prefix() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("SCAMSHIELD_PORT", "9999");
        std::env::set_var("SCAMSHIELD_LLM__PROVIDER", "openai");
        std::env::set_var("SCAMSHIELD_LLM__API_KEY", "sk-doc");

        let config = ServerConfig::load_from("config/does-not-exist");

        std::env::remove_var("SCAMSHIELD_PORT");
        std::env::remove_var("SCAMSHIELD_LLM__PROVIDER");
        std::env::remove_var("SCAMSHIELD_LLM__API_KEY");

        let config = config.unwrap();
        assert_eq!(config.port, 9999);
        let llm = config.llm.expect("llm section from environment");
        assert_eq!(llm.provider, ProviderKind::OpenAI);
        assert_eq!(llm.api_key, "sk-doc");
    }

    #[test]
    fn test_malformed_config_file_is_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("server.yaml");
        std::fs::write(&path, "port: [not, a, port\nhost: :::").unwrap();

        let result = ServerConfig::load_from(path.to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_is_read() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("server.yaml");
        std::fs::write(&path, "port: 7070\ninvestigator: canned\n").unwrap();

        let config = ServerConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.port, 7070);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let config = ServerConfig {
            llm: Some(LlmSettings {
                provider: ProviderKind::Anthropic,
                api_key: "sk-ant-very-secret".to_string(),
                model: None,
                base_url: None,
                cache: true,
                cache_ttl_minutes: 60,
            }),
            intel_sources: vec![
                IntelSourceSetting::Preset {
                    preset: "shodan".to_string(),
                    api_key: "shodan-very-secret".to_string(),
                },
                IntelSourceSetting::Custom(
                    IntelSource::preset("ipinfo", "ipinfo-very-secret").unwrap(),
                ),
            ],
            ..ServerConfig::default()
        };

        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-ant-very-secret"));
        assert!(!debug.contains("shodan-very-secret"));
        assert!(!debug.contains("ipinfo-very-secret"));
        assert!(debug.contains("shodan"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_llm_settings_defaults() {
        let settings: LlmSettings =
            serde_json::from_value(serde_json::json!({"provider": "anthropic"})).unwrap();
        assert_eq!(settings.provider, ProviderKind::Anthropic);
        assert!(settings.cache);
        assert_eq!(settings.cache_ttl_minutes, 60);
        assert!(settings.model.is_none());
    }
}

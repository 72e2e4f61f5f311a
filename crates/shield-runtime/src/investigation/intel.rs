//! External intelligence lookups
//!
//! Each [`IntelSource`] describes one HTTP JSON API: where it lives, how it
//! authenticates and which target kinds it understands. [`IntelInvestigator`]
//! queries every applicable source concurrently and folds the answers into
//! findings.

use super::{recommendations_for, InvestigationRequest, Investigator};
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use shield_core::{Finding, InvestigationFindings, Severity, TargetKind};
use std::fmt;
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// How a source expects its API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntelAuth {
    /// Key sent verbatim in the named header
    Header { name: String },
    /// Key sent as the named query parameter
    Query { name: String },
    /// `Authorization: Bearer <key>`
    Bearer,
    None,
}

/// One external intelligence API
///
/// `Debug` output never includes the API key.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelSource {
    pub name: String,
    pub base_url: String,
    /// Path template, `{target}` is replaced by the url-encoded target
    pub path: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub auth: IntelAuth,
    pub supports: Vec<TargetKind>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// JSON pointer to a 0-100 risk score in the response, if the API has one
    #[serde(default)]
    pub risk_pointer: Option<String>,
}

impl IntelSource {
    /// Built-in source definitions by name
    pub fn preset(name: &str, api_key: impl Into<String>) -> Option<Self> {
        let api_key = Some(api_key.into());
        let source = match name {
            "whoisxml" => Self {
                name: "whoisxml".to_string(),
                base_url: "https://www.whoisxmlapi.com".to_string(),
                path: "/whoisserver/WhoisService?domainName={target}&outputFormat=JSON"
                    .to_string(),
                api_key,
                auth: IntelAuth::Query {
                    name: "apiKey".to_string(),
                },
                supports: vec![TargetKind::Domain],
                timeout_ms: DEFAULT_TIMEOUT_MS,
                risk_pointer: None,
            },
            "shodan" => Self {
                name: "shodan".to_string(),
                base_url: "https://api.shodan.io".to_string(),
                path: "/shodan/host/{target}".to_string(),
                api_key,
                auth: IntelAuth::Query {
                    name: "key".to_string(),
                },
                supports: vec![TargetKind::IpAddress],
                timeout_ms: DEFAULT_TIMEOUT_MS,
                risk_pointer: None,
            },
            "ipinfo" => Self {
                name: "ipinfo".to_string(),
                base_url: "https://ipinfo.io".to_string(),
                path: "/{target}/json".to_string(),
                api_key,
                auth: IntelAuth::Bearer,
                supports: vec![TargetKind::IpAddress],
                timeout_ms: DEFAULT_TIMEOUT_MS,
                risk_pointer: None,
            },
            "opensanctions" => Self {
                name: "opensanctions".to_string(),
                base_url: "https://api.opensanctions.org".to_string(),
                path: "/search/default?q={target}".to_string(),
                api_key,
                auth: IntelAuth::Header {
                    name: "Authorization".to_string(),
                },
                supports: vec![TargetKind::Company, TargetKind::Email, TargetKind::Phone],
                timeout_ms: DEFAULT_TIMEOUT_MS,
                risk_pointer: Some("/results/0/score".to_string()),
            },
            "companies_house" => Self {
                name: "companies_house".to_string(),
                base_url: "https://api.company-information.service.gov.uk".to_string(),
                path: "/search/companies?q={target}".to_string(),
                api_key,
                auth: IntelAuth::Header {
                    name: "Authorization".to_string(),
                },
                supports: vec![TargetKind::Company],
                timeout_ms: DEFAULT_TIMEOUT_MS,
                risk_pointer: None,
            },
            _ => return None,
        };
        Some(source)
    }

    pub fn supports(&self, kind: TargetKind) -> bool {
        self.supports.contains(&kind)
    }

    /// What to send this source for a target, or `None` if it does not apply
    ///
    /// URL targets go to domain-only sources as their host name.
    pub fn lookup_target(&self, target: &str, kind: TargetKind) -> Option<String> {
        if self.supports(kind) {
            return Some(target.to_string());
        }
        if kind == TargetKind::Url && self.supports(TargetKind::Domain) {
            return reqwest::Url::parse(target)
                .ok()
                .and_then(|url| url.host_str().map(str::to_string));
        }
        None
    }

    fn url_for(&self, target: &str) -> String {
        let path = self
            .path
            .replace("{target}", &urlencoding::encode(target));
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl fmt::Debug for IntelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntelSource")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("auth", &self.auth)
            .field("supports", &self.supports)
            .field("timeout_ms", &self.timeout_ms)
            .field("risk_pointer", &self.risk_pointer)
            .finish()
    }
}

/// HTTP client for intelligence sources
#[derive(Clone)]
pub struct IntelClient {
    client: reqwest::Client,
}

impl IntelClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Query one source for a target
    pub async fn lookup(&self, source: &IntelSource, target: &str) -> Result<serde_json::Value> {
        let url = source.url_for(target);
        tracing::debug!(source = %source.name, "Calling intelligence source: {}", url);

        let mut request = self
            .client
            .get(&url)
            .timeout(Duration::from_millis(source.timeout_ms));

        if let Some(key) = &source.api_key {
            request = match &source.auth {
                IntelAuth::Header { name } => request.header(name.as_str(), key.as_str()),
                IntelAuth::Query { name } => request.query(&[(name.as_str(), key.as_str())]),
                IntelAuth::Bearer => request.bearer_auth(key),
                IntelAuth::None => request,
            };
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RuntimeError::Timeout(format!("{} after {}ms", source.name, source.timeout_ms))
            } else {
                RuntimeError::ExternalCallFailed(format!("{}: {}", source.name, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => RuntimeError::Unauthorized(source.name.clone()),
                404 => RuntimeError::NotFound(format!("{} has no record for {}", source.name, target)),
                429 => {
                    tracing::warn!(source = %source.name, "Intelligence source rate limited us");
                    RuntimeError::RateLimited(source.name.clone())
                }
                _ => RuntimeError::ExternalCallFailed(format!(
                    "{} returned status {}",
                    source.name, status
                )),
            });
        }

        response
            .json()
            .await
            .map_err(|e| RuntimeError::InvalidResponse(format!("{}: {}", source.name, e)))
    }
}

impl Default for IntelClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a 0-100 score to a severity
fn severity_from_score(score: f64) -> Severity {
    match score {
        s if s >= 90.0 => Severity::Critical,
        s if s >= 70.0 => Severity::High,
        s if s >= 40.0 => Severity::Medium,
        s if s > 0.0 => Severity::Low,
        _ => Severity::Info,
    }
}

fn finding_from_response(source: &IntelSource, target: &str, body: &serde_json::Value) -> Finding {
    let score = source
        .risk_pointer
        .as_deref()
        .and_then(|pointer| body.pointer(pointer))
        .and_then(|v| v.as_f64())
        .map(|v| if v <= 1.0 { v * 100.0 } else { v });

    let fields = match body {
        serde_json::Value::Object(map) => map.keys().take(5).cloned().collect::<Vec<_>>().join(", "),
        _ => String::new(),
    };

    let summary = match score {
        Some(score) => format!("{} rates {} at {:.0}/100", source.name, target, score),
        None if fields.is_empty() => format!("{} returned a record for {}", source.name, target),
        None => format!("{} returned a record for {} ({})", source.name, target, fields),
    };

    Finding::new(
        source.name.clone(),
        score.map(severity_from_score).unwrap_or(Severity::Info),
        summary,
        source.name.clone(),
    )
}

/// Investigator backed by external intelligence APIs
pub struct IntelInvestigator {
    sources: Vec<IntelSource>,
    client: IntelClient,
}

impl IntelInvestigator {
    pub fn new(sources: Vec<IntelSource>) -> Self {
        Self {
            sources,
            client: IntelClient::new(),
        }
    }

    pub fn sources(&self) -> &[IntelSource] {
        &self.sources
    }
}

#[async_trait]
impl Investigator for IntelInvestigator {
    async fn investigate(&self, request: &InvestigationRequest) -> Result<InvestigationFindings> {
        let applicable: Vec<(&IntelSource, String)> = self
            .sources
            .iter()
            .filter_map(|s| {
                s.lookup_target(&request.target, request.target_kind)
                    .map(|target| (s, target))
            })
            .collect();

        if applicable.is_empty() {
            return Err(RuntimeError::NoSources(format!(
                "{} ({})",
                request.target, request.target_kind
            )));
        }

        let lookups = applicable
            .iter()
            .map(|(source, target)| self.client.lookup(source, target));
        let results = join_all(lookups).await;

        let mut findings = Vec::new();
        let mut failures = 0;
        for ((source, target), result) in applicable.iter().zip(results) {
            match result {
                Ok(body) => findings.push(finding_from_response(source, target, &body)),
                Err(RuntimeError::NotFound(msg)) => findings.push(Finding::new(
                    source.name.clone(),
                    Severity::Info,
                    msg,
                    source.name.clone(),
                )),
                Err(e) => {
                    failures += 1;
                    tracing::warn!(source = %source.name, error = %e, "Intelligence lookup failed");
                    findings.push(Finding::new(
                        "source_error",
                        Severity::Info,
                        format!("{} was unavailable: {}", source.name, e),
                        source.name.clone(),
                    ));
                }
            }
        }

        if failures == applicable.len() {
            return Err(RuntimeError::NoSources(request.target.clone()));
        }

        let summary = format!(
            "Queried {} intelligence sources for {} ({} unavailable)",
            applicable.len(),
            request.target,
            failures
        );
        let result = InvestigationFindings::from_findings(summary, findings);
        let recommendations = recommendations_for(&result);
        Ok(result.with_recommendations(recommendations))
    }

    fn name(&self) -> &str {
        "intel"
    }
}

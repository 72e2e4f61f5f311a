//! Analyst-model investigator

use super::{InvestigationRequest, Investigator};
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use serde::Deserialize;
use shield_core::{Addon, Finding, InvestigationFindings, Severity};
use shield_llm::{extract_json_block, LLMClient, LLMRequest};
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a fraud investigator working for a scam victim \
support service. You assess whether a target is involved in fraud and answer only \
with a single JSON object.";

#[derive(Debug, Deserialize)]
struct AnalystFinding {
    category: String,
    severity: Severity,
    summary: String,
}

#[derive(Debug, Deserialize)]
struct AnalystReport {
    summary: String,
    /// Models sometimes answer with fractions or out-of-range values
    #[serde(default)]
    risk_score: Option<f64>,
    #[serde(default)]
    findings: Vec<AnalystFinding>,
    #[serde(default)]
    recommendations: Vec<String>,
}

/// Investigator that asks an LLM to act as the analyst
pub struct LlmInvestigator {
    client: Arc<dyn LLMClient>,
    model: String,
    max_tokens: u32,
}

impl LlmInvestigator {
    pub fn new(client: Arc<dyn LLMClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 2048,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_prompt(request: &InvestigationRequest) -> String {
        let mut prompt = format!(
            "Investigate the {} \"{}\" for signs of fraud.\n\
             Investigation type: {}\n\
             Report at most {} findings.\n",
            request.target_kind,
            request.target,
            request.investigation_type,
            request.findings_budget()
        );
        if request.has_addon(Addon::DarkWebScan) {
            prompt.push_str("Include any dark web exposure you are aware of.\n");
        }
        if request.has_addon(Addon::AssetTracing) {
            prompt.push_str("Include where victim funds were likely moved.\n");
        }
        prompt.push_str(
            "\nRespond with JSON of the form:\n\
             {\"summary\": string, \"risk_score\": 0-100, \
             \"findings\": [{\"category\": string, \"severity\": \
             \"info|low|medium|high|critical\", \"summary\": string}], \
             \"recommendations\": [string]}",
        );
        prompt
    }
}

#[async_trait]
impl Investigator for LlmInvestigator {
    async fn investigate(&self, request: &InvestigationRequest) -> Result<InvestigationFindings> {
        let llm_request = LLMRequest::new(Self::build_prompt(request), self.model.clone())
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens)
            .with_temperature(0.2)
            .with_json_mode();

        let response = self.client.call(llm_request).await?;
        tracing::debug!(
            provider = self.client.name(),
            tokens = response.tokens_used,
            "Analyst model responded"
        );

        let json = extract_json_block(&response.content).ok_or_else(|| {
            RuntimeError::InvalidResponse("analyst response contains no JSON object".to_string())
        })?;
        let report: AnalystReport = serde_json::from_str(json)?;

        let source = format!("{}:{}", self.client.name(), self.model);
        let findings: Vec<Finding> = report
            .findings
            .into_iter()
            .take(request.findings_budget())
            .map(|f| Finding::new(f.category, f.severity, f.summary, source.clone()))
            .collect();

        let mut result = InvestigationFindings::from_findings(report.summary, findings)
            .with_recommendations(report.recommendations);
        if let Some(score) = report.risk_score.filter(|s| s.is_finite()) {
            result = result.with_risk_score(score.round().clamp(0.0, 100.0) as u8);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "llm"
    }
}

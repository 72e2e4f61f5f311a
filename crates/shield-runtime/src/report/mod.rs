//! Report generation
//!
//! A [`ReportGenerator`] renders the findings of an order into one artifact
//! per output format the tier includes.

mod template;

pub use template::TemplateReportGenerator;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shield_core::{
    Finding, InvestigationFindings, Order, ReportBundle, ReportSection, RiskLevel, TargetKind,
    Tier,
};

/// Renders reports for completed investigations
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, order: &Order, findings: &InvestigationFindings)
        -> Result<ReportBundle>;
}

/// Format-independent report content, limited to the sections of the tier
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub order_id: String,
    pub tier: Tier,
    pub target: String,
    pub target_kind: TargetKind,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<Vec<Finding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_log: Option<Vec<EvidenceEntry>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskSection {
    pub score: u8,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvidenceEntry {
    pub source: String,
    pub category: String,
    pub recorded_at: DateTime<Utc>,
}

impl ReportDocument {
    pub fn build(order: &Order, findings: &InvestigationFindings) -> Self {
        let profile = order.tier.profile();
        let has = |section| profile.includes(section);

        Self {
            order_id: order.order_id.clone(),
            tier: order.tier,
            target: order.target.clone(),
            target_kind: order.target_kind,
            generated_at: Utc::now(),
            sections: profile.sections.to_vec(),
            executive_summary: has(ReportSection::ExecutiveSummary)
                .then(|| findings.summary.clone()),
            risk: has(ReportSection::RiskAssessment).then(|| RiskSection {
                score: findings.risk_score,
                level: findings.risk_level,
            }),
            findings: has(ReportSection::Findings).then(|| findings.findings.clone()),
            recommendations: has(ReportSection::Recommendations)
                .then(|| findings.recommendations.clone()),
            methodology: has(ReportSection::Methodology).then(|| {
                let mut steps = vec![format!(
                    "Target classified as {} and checked against {} source(s).",
                    order.target_kind,
                    findings.sources.len()
                )];
                steps.extend(findings.sources.iter().map(|s| format!("Queried {}", s)));
                steps.push(
                    "Finding severities weighted into a 0-100 risk score.".to_string(),
                );
                steps
            }),
            evidence_log: has(ReportSection::EvidenceLog).then(|| {
                findings
                    .findings
                    .iter()
                    .map(|f| EvidenceEntry {
                        source: f.source.clone(),
                        category: f.category.clone(),
                        recorded_at: findings.completed_at,
                    })
                    .collect()
            }),
        }
    }
}

//! Investigation stage
//!
//! An [`Investigator`] turns a target into [`InvestigationFindings`]. Three
//! implementations exist: a canned one for demos and tests, one that fans out
//! to external intelligence APIs, and one that asks an analyst model.

mod canned;
mod intel;
mod llm;

pub use canned::CannedInvestigator;
pub use intel::{IntelAuth, IntelClient, IntelInvestigator, IntelSource};
pub use llm::LlmInvestigator;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shield_core::{Addon, InvestigationFindings, Order, TargetKind, Tier};

/// What to investigate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationRequest {
    /// Owning order, `None` for previews
    pub order_id: Option<String>,
    pub target: String,
    pub target_kind: TargetKind,
    pub tier: Tier,
    pub investigation_type: String,
    #[serde(default)]
    pub addons: Vec<Addon>,
}

impl InvestigationRequest {
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: Some(order.order_id.clone()),
            target: order.target.clone(),
            target_kind: order.target_kind,
            tier: order.tier,
            investigation_type: order.investigation_type.clone(),
            addons: order.addons.clone(),
        }
    }

    /// Request not tied to an order
    pub fn preview(target: impl Into<String>, target_kind: TargetKind, tier: Tier) -> Self {
        Self {
            order_id: None,
            target: target.into(),
            target_kind,
            tier,
            investigation_type: "general".to_string(),
            addons: Vec::new(),
        }
    }

    /// Number of findings the tier asks for
    pub fn findings_budget(&self) -> usize {
        self.tier.profile().findings
    }

    pub fn has_addon(&self, addon: Addon) -> bool {
        self.addons.contains(&addon)
    }
}

/// Runs the investigation for a target
#[async_trait]
pub trait Investigator: Send + Sync {
    async fn investigate(&self, request: &InvestigationRequest) -> Result<InvestigationFindings>;

    fn name(&self) -> &str;
}

/// Recommendations matching the overall risk
pub(crate) fn recommendations_for(findings: &InvestigationFindings) -> Vec<String> {
    use shield_core::RiskLevel;

    let mut recs = match findings.risk_level {
        RiskLevel::Low => vec![
            "No strong fraud indicators were found; keep normal caution.".to_string(),
        ],
        RiskLevel::Medium => vec![
            "Verify the counterparty through an independent channel before paying.".to_string(),
            "Keep records of all communication and transactions.".to_string(),
        ],
        RiskLevel::High | RiskLevel::Critical => vec![
            "Stop all payments to this party immediately.".to_string(),
            "Contact your bank or card issuer to dispute recent transactions.".to_string(),
            "Report the incident to local law enforcement and the relevant fraud authority."
                .to_string(),
        ],
    };
    if findings.risk_level == RiskLevel::Critical {
        recs.push("Preserve all evidence; do not contact the suspected scammer.".to_string());
    }
    recs
}

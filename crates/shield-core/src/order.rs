//! Order record and its nested results

use crate::error::{CoreError, Result};
use crate::pricing::{Addon, PricingQuote};
use crate::status::OrderStatus;
use crate::target::TargetKind;
use crate::tier::{ReportFormat, Tier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    Paypal,
    Manual,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Confirmed payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub payment_id: String,
    pub amount: f64,
    pub confirmed_at: DateTime<Utc>,
}

/// Severity of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Weight used when folding findings into a 0-100 risk score
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Low => 20,
            Severity::Medium => 45,
            Severity::High => 75,
            Severity::Critical => 95,
        }
    }
}

/// Overall risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => RiskLevel::Low,
            25..=49 => RiskLevel::Medium,
            50..=74 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// One observation produced by an investigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub category: String,
    pub severity: Severity,
    pub summary: String,
    /// Where the observation came from (source name, model, ...)
    pub source: String,
}

impl Finding {
    pub fn new(
        category: impl Into<String>,
        severity: Severity,
        summary: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            severity,
            summary: summary.into(),
            source: source.into(),
        }
    }
}

/// Result of the investigation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationFindings {
    pub summary: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub findings: Vec<Finding>,
    pub sources: Vec<String>,
    pub recommendations: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl InvestigationFindings {
    /// Build findings, deriving the risk score from finding severities
    ///
    /// The score is the mean severity weight, nudged up towards the worst
    /// finding so a single critical hit is not averaged away.
    pub fn from_findings(summary: impl Into<String>, findings: Vec<Finding>) -> Self {
        let risk_score = score_findings(&findings);
        let mut sources: Vec<String> = findings.iter().map(|f| f.source.clone()).collect();
        sources.sort();
        sources.dedup();

        Self {
            summary: summary.into(),
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            findings,
            sources,
            recommendations: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Override the derived score (e.g. when an analyst model supplies one)
    pub fn with_risk_score(mut self, score: u8) -> Self {
        let score = score.min(100);
        self.risk_score = score;
        self.risk_level = RiskLevel::from_score(score);
        self
    }
}

fn score_findings(findings: &[Finding]) -> u8 {
    if findings.is_empty() {
        return 0;
    }
    let total: u32 = findings.iter().map(|f| f.severity.weight() as u32).sum();
    let mean = total / findings.len() as u32;
    let worst = findings
        .iter()
        .map(|f| f.severity.weight() as u32)
        .max()
        .unwrap_or(0);
    ((mean + worst) / 2).min(100) as u8
}

/// One rendered report file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub format: ReportFormat,
    pub path: String,
    pub size_bytes: u64,
}

/// All report files produced for an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    pub artifacts: Vec<ReportArtifact>,
    pub generated_at: DateTime<Utc>,
}

impl ReportBundle {
    pub fn artifact(&self, format: ReportFormat) -> Option<&ReportArtifact> {
        self.artifacts.iter().find(|a| a.format == format)
    }
}

/// Delivery details once the report is handed over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub email: String,
    pub download_links: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub delivered_at: DateTime<Utc>,
}

/// Nested stage results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderResults {
    pub investigation: Option<InvestigationFindings>,
    pub report: Option<ReportBundle>,
    pub delivery: Option<DeliveryInfo>,
}

/// Entry in an order's status timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: Option<OrderStatus>,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A unit of work tracked from payment to delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_email: String,
    pub target: String,
    pub target_kind: TargetKind,
    pub tier: Tier,
    pub investigation_type: String,
    pub addons: Vec<Addon>,
    pub quote: PricingQuote,
    pub price: f64,
    pub payment_method: PaymentMethod,
    pub payment: Option<PaymentInfo>,
    pub status: OrderStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub results: OrderResults,
    pub error: Option<String>,
    pub history: Vec<StatusChange>,
    /// Optimistic concurrency token, bumped by the store on every update
    pub version: u64,
}

/// Everything needed to open a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub customer_email: String,
    pub target: String,
    pub target_kind: TargetKind,
    pub investigation_type: String,
    pub quote: PricingQuote,
    pub addons: Vec<Addon>,
    pub payment_method: PaymentMethod,
}

impl Order {
    /// Open an order in `pending_payment`
    pub fn new(params: NewOrder) -> Self {
        let now = Utc::now();
        let status = OrderStatus::PendingPayment;

        Self {
            order_id: params.order_id,
            customer_email: params.customer_email,
            target: params.target,
            target_kind: params.target_kind,
            tier: params.quote.tier,
            investigation_type: params.investigation_type,
            addons: params.addons,
            price: params.quote.total_price,
            quote: params.quote,
            payment_method: params.payment_method,
            payment: None,
            status,
            progress: status.progress().unwrap_or(0),
            created_at: now,
            updated_at: now,
            results: OrderResults::default(),
            error: None,
            history: vec![StatusChange {
                from: None,
                to: status,
                at: now,
                note: Some("order created".to_string()),
            }],
            version: 0,
        }
    }

    /// Move to `to`, updating progress, timestamp and history
    pub fn transition(&mut self, to: OrderStatus, note: Option<String>) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        let now = Utc::now();
        let from = self.status;
        self.status = to;
        if let Some(progress) = to.progress() {
            self.progress = progress;
        }
        self.updated_at = now;
        self.history.push(StatusChange {
            from: Some(from),
            to,
            at: now,
            note,
        });

        Ok(())
    }

    /// Mark the order failed with the given error
    pub fn fail(&mut self, error: impl Into<String>) -> Result<()> {
        let error = error.into();
        self.transition(OrderStatus::Failed, Some(error.clone()))?;
        self.error = Some(error);
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

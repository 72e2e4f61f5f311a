//! Service tiers
//!
//! A tier controls the price of an investigation, its delivery SLA, how many
//! findings the investigation aims for and which report sections and formats
//! are produced.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pricing / service level of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Standard,
    Professional,
    Forensic,
}

impl Tier {
    /// All tiers, cheapest first
    pub const ALL: [Tier; 4] = [
        Tier::Basic,
        Tier::Standard,
        Tier::Professional,
        Tier::Forensic,
    ];

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Standard => "standard",
            Tier::Professional => "professional",
            Tier::Forensic => "forensic",
        }
    }

    /// Static service profile for this tier
    pub fn profile(&self) -> TierProfile {
        use ReportFormat::*;
        use ReportSection::*;

        match self {
            Tier::Basic => TierProfile {
                tier: *self,
                display_name: "Basic Scan",
                base_price: 49.00,
                delivery_hours: 72,
                findings: 3,
                sections: &[ExecutiveSummary, RiskAssessment, Findings],
                formats: &[Json, Html],
            },
            Tier::Standard => TierProfile {
                tier: *self,
                display_name: "Standard Investigation",
                base_price: 149.00,
                delivery_hours: 48,
                findings: 5,
                sections: &[ExecutiveSummary, RiskAssessment, Findings, Recommendations],
                formats: &[Json, Html],
            },
            Tier::Professional => TierProfile {
                tier: *self,
                display_name: "Professional Investigation",
                base_price: 399.00,
                delivery_hours: 24,
                findings: 8,
                sections: &[
                    ExecutiveSummary,
                    RiskAssessment,
                    Findings,
                    Recommendations,
                    Methodology,
                ],
                formats: &[Json, Html, Markdown],
            },
            Tier::Forensic => TierProfile {
                tier: *self,
                display_name: "Forensic Investigation",
                base_price: 999.00,
                delivery_hours: 12,
                findings: 12,
                sections: &[
                    ExecutiveSummary,
                    RiskAssessment,
                    Findings,
                    Recommendations,
                    Methodology,
                    EvidenceLog,
                ],
                formats: &[Json, Html, Markdown],
            },
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Tier::Basic),
            "standard" => Ok(Tier::Standard),
            "professional" => Ok(Tier::Professional),
            "forensic" => Ok(Tier::Forensic),
            _ => Err(CoreError::InvalidTier(s.to_string())),
        }
    }
}

/// Static description of what a tier includes
#[derive(Debug, Clone, Serialize)]
pub struct TierProfile {
    pub tier: Tier,
    pub display_name: &'static str,
    pub base_price: f64,
    /// Delivery SLA in hours
    pub delivery_hours: u32,
    /// Number of findings an investigation should aim for
    pub findings: usize,
    pub sections: &'static [ReportSection],
    pub formats: &'static [ReportFormat],
}

impl TierProfile {
    pub fn includes(&self, section: ReportSection) -> bool {
        self.sections.contains(&section)
    }
}

/// Section of a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    ExecutiveSummary,
    RiskAssessment,
    Findings,
    Recommendations,
    Methodology,
    EvidenceLog,
}

impl ReportSection {
    pub fn title(&self) -> &'static str {
        match self {
            ReportSection::ExecutiveSummary => "Executive Summary",
            ReportSection::RiskAssessment => "Risk Assessment",
            ReportSection::Findings => "Findings",
            ReportSection::Recommendations => "Recommendations",
            ReportSection::Methodology => "Methodology",
            ReportSection::EvidenceLog => "Evidence Log",
        }
    }
}

/// Output format of a report artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Html,
    Markdown,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "markdown",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Html => "text/html; charset=utf-8",
            ReportFormat::Markdown => "text/markdown; charset=utf-8",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(format!("Unsupported report format: {}", other)),
        }
    }
}

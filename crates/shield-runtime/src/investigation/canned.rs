//! Canned investigator
//!
//! Produces plausible findings from a fixed catalogue without touching the
//! network. Used for demos, previews and tests.

use super::{recommendations_for, InvestigationRequest, Investigator};
use crate::error::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shield_core::{Addon, Finding, InvestigationFindings, Severity, TargetKind};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const SOURCE: &str = "scamshield-canned";

type Entry = (&'static str, Severity, &'static str);

const GENERAL: &[Entry] = &[
    ("reputation", Severity::Medium, "{target} appears in 3 community scam reports from the last 90 days"),
    ("reputation", Severity::Low, "{target} has no presence on established review platforms"),
    ("social", Severity::Medium, "Social media accounts linked to {target} were created within the last month"),
    ("social", Severity::Info, "No verified social media presence found for {target}"),
    ("payments", Severity::High, "Victims report being asked to pay {target} via gift cards or crypto"),
    ("pattern", Severity::Medium, "Messaging linked to {target} matches a known advance-fee script"),
    ("pattern", Severity::Info, "No overlap with known phishing kits was detected for {target}"),
];

const DOMAIN: &[Entry] = &[
    ("whois", Severity::High, "{target} was registered less than 30 days ago"),
    ("whois", Severity::Medium, "Registrant details for {target} are hidden behind a privacy proxy"),
    ("dns", Severity::Low, "{target} uses a free DNS provider popular with throwaway sites"),
    ("tls", Severity::Info, "{target} serves a valid certificate issued by a free CA"),
    ("hosting", Severity::Medium, "{target} is hosted on infrastructure shared with flagged domains"),
    ("content", Severity::High, "Site content on {target} is cloned from a legitimate retailer"),
];

const EMAIL: &[Entry] = &[
    ("breach", Severity::Low, "{target} appears in 2 public data breaches"),
    ("mailbox", Severity::Medium, "{target} uses a disposable mail provider"),
    ("reports", Severity::High, "{target} was used as a contact in reported romance scams"),
    ("mailbox", Severity::Info, "The domain of {target} publishes SPF and DMARC records"),
    ("reports", Severity::Medium, "{target} sent invoices that reuse a template from a known fraud ring"),
];

const IP: &[Entry] = &[
    ("network", Severity::Medium, "{target} belongs to a bulletproof hosting provider"),
    ("blocklist", Severity::High, "{target} is listed on 2 spam blocklists"),
    ("geo", Severity::Info, "{target} geolocates to a different country than claimed"),
    ("ports", Severity::Low, "{target} exposes an unauthenticated admin panel"),
    ("hosting", Severity::Medium, "{target} hosts several look-alike banking domains"),
];

const PHONE: &[Entry] = &[
    ("carrier", Severity::Medium, "{target} is a VoIP number that can be registered anonymously"),
    ("reports", Severity::High, "{target} is reported in multiple robocall complaints"),
    ("carrier", Severity::Info, "{target} was ported to a new carrier recently"),
    ("messaging", Severity::Medium, "{target} sent SMS messages impersonating a parcel courier"),
    ("reports", Severity::Low, "{target} is listed on a community caller-ID spam board"),
];

const COMPANY: &[Entry] = &[
    ("registry", Severity::High, "No company registration matching {target} was found"),
    ("sanctions", Severity::Info, "{target} does not appear on consolidated sanctions lists"),
    ("registry", Severity::Medium, "Registered address for {target} is a virtual office"),
    ("officers", Severity::Medium, "Directors of {target} are linked to 4 dissolved companies"),
    ("filings", Severity::Low, "{target} has not filed accounts for the last two years"),
];

/// Investigator backed by a fixed catalogue of findings
pub struct CannedInvestigator {
    seed: Option<u64>,
}

impl CannedInvestigator {
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Deterministic variant: the same seed and target give the same findings
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng_for(&self, target: &str) -> StdRng {
        match self.seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                target.to_lowercase().hash(&mut hasher);
                StdRng::seed_from_u64(seed ^ hasher.finish())
            }
            None => StdRng::from_entropy(),
        }
    }

    fn catalogue(kind: TargetKind) -> &'static [Entry] {
        match kind {
            TargetKind::Domain | TargetKind::Url => DOMAIN,
            TargetKind::Email => EMAIL,
            TargetKind::IpAddress => IP,
            TargetKind::Phone => PHONE,
            TargetKind::Company => COMPANY,
        }
    }
}

impl Default for CannedInvestigator {
    fn default() -> Self {
        Self::new()
    }
}

fn to_finding(entry: &Entry, target: &str) -> Finding {
    let (category, severity, template) = entry;
    Finding::new(*category, *severity, template.replace("{target}", target), SOURCE)
}

#[async_trait]
impl Investigator for CannedInvestigator {
    async fn investigate(&self, request: &InvestigationRequest) -> Result<InvestigationFindings> {
        let mut rng = self.rng_for(&request.target);
        let budget = request.findings_budget();

        let specific = Self::catalogue(request.target_kind);
        let mut picked: Vec<Finding> = specific
            .choose_multiple(&mut rng, budget.min(specific.len()))
            .map(|e| to_finding(e, &request.target))
            .collect();

        let remaining = budget.saturating_sub(picked.len());
        picked.extend(
            GENERAL
                .choose_multiple(&mut rng, remaining.min(GENERAL.len()))
                .map(|e| to_finding(e, &request.target)),
        );

        if request.has_addon(Addon::DarkWebScan) {
            picked.push(Finding::new(
                "dark_web",
                Severity::Medium,
                format!("{} is mentioned in 1 dark web marketplace listing", request.target),
                SOURCE,
            ));
        }
        if request.has_addon(Addon::AssetTracing) {
            picked.push(Finding::new(
                "assets",
                Severity::Info,
                format!("Payments to {} were traced to 2 exchange deposit addresses", request.target),
                SOURCE,
            ));
        }

        tracing::debug!(
            target_kind = %request.target_kind,
            findings = picked.len(),
            "Canned investigation complete"
        );

        let summary = format!(
            "{} investigation of {} ({}) produced {} findings",
            request.tier.profile().display_name,
            request.target,
            request.target_kind,
            picked.len()
        );
        let findings = InvestigationFindings::from_findings(summary, picked);
        let recommendations = recommendations_for(&findings);
        Ok(findings.with_recommendations(recommendations))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_core::Tier;

    fn request(target: &str, kind: TargetKind, tier: Tier) -> InvestigationRequest {
        InvestigationRequest::preview(target, kind, tier)
    }

    #[tokio::test]
    async fn test_findings_follow_tier_budget() {
        let investigator = CannedInvestigator::seeded(7);
        let targets = [
            ("example.com", TargetKind::Domain),
            ("https://example.com/pay", TargetKind::Url),
            ("scam@example.com", TargetKind::Email),
            ("203.0.113.9", TargetKind::IpAddress),
            ("+15551234567", TargetKind::Phone),
            ("Acme Holdings", TargetKind::Company),
        ];
        for (target, kind) in targets {
            for tier in Tier::ALL {
                let result = investigator
                    .investigate(&request(target, kind, tier))
                    .await
                    .unwrap();
                assert_eq!(
                    result.findings.len(),
                    tier.profile().findings,
                    "{} / {}",
                    kind,
                    tier
                );
                assert!(!result.recommendations.is_empty());
                assert_eq!(result.sources, vec![SOURCE.to_string()]);
            }
        }
    }

    #[test]
    fn test_catalogues_cover_largest_budget() {
        let largest = Tier::ALL.iter().map(|t| t.profile().findings).max().unwrap();
        for kind in [
            TargetKind::Domain,
            TargetKind::Email,
            TargetKind::IpAddress,
            TargetKind::Phone,
            TargetKind::Company,
        ] {
            assert!(CannedInvestigator::catalogue(kind).len() + GENERAL.len() >= largest);
        }
    }

    #[tokio::test]
    async fn test_seeded_is_deterministic() {
        let req = request("+15551234567", TargetKind::Phone, Tier::Standard);
        let a = CannedInvestigator::seeded(42).investigate(&req).await.unwrap();
        let b = CannedInvestigator::seeded(42).investigate(&req).await.unwrap();
        assert_eq!(a.findings, b.findings);
        assert_eq!(a.risk_score, b.risk_score);
    }

    #[tokio::test]
    async fn test_findings_mention_target() {
        let result = CannedInvestigator::new()
            .investigate(&request("scam@example.com", TargetKind::Email, Tier::Basic))
            .await
            .unwrap();
        assert!(result.findings.iter().all(|f| f.summary.contains("scam@example.com")));
    }

    #[tokio::test]
    async fn test_addons_add_findings() {
        let mut req = request("example.com", TargetKind::Domain, Tier::Professional);
        req.addons = vec![Addon::DarkWebScan, Addon::AssetTracing];
        let result = CannedInvestigator::seeded(1).investigate(&req).await.unwrap();
        assert_eq!(result.findings.len(), 10);
        assert!(result.findings.iter().any(|f| f.category == "dark_web"));
        assert!(result.findings.iter().any(|f| f.category == "assets"));
    }
}

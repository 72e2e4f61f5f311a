//! Quote calculation
//!
//! `total_price = base_price + addon_total - discount_amount`, every amount
//! rounded to cents.

use crate::error::{CoreError, Result};
use crate::tier::{Tier, TierProfile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CURRENCY: &str = "USD";

/// Optional extras that can be bought on top of a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addon {
    ExpeditedDelivery,
    DarkWebScan,
    AssetTracing,
    LegalEvidencePack,
    ContinuousMonitoring,
}

impl Addon {
    pub const ALL: [Addon; 5] = [
        Addon::ExpeditedDelivery,
        Addon::DarkWebScan,
        Addon::AssetTracing,
        Addon::LegalEvidencePack,
        Addon::ContinuousMonitoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Addon::ExpeditedDelivery => "expedited_delivery",
            Addon::DarkWebScan => "dark_web_scan",
            Addon::AssetTracing => "asset_tracing",
            Addon::LegalEvidencePack => "legal_evidence_pack",
            Addon::ContinuousMonitoring => "continuous_monitoring",
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            Addon::ExpeditedDelivery => 79.00,
            Addon::DarkWebScan => 129.00,
            Addon::AssetTracing => 249.00,
            Addon::LegalEvidencePack => 199.00,
            Addon::ContinuousMonitoring => 99.00,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Addon::ExpeditedDelivery => "Halves the delivery SLA",
            Addon::DarkWebScan => "Search breach dumps and marketplaces for the target",
            Addon::AssetTracing => "Follow payment trails and linked wallets",
            Addon::LegalEvidencePack => "Chain-of-custody evidence bundle for legal use",
            Addon::ContinuousMonitoring => "30 days of change alerts on the target",
        }
    }

    pub fn available_for(&self, tier: Tier) -> bool {
        match self {
            Addon::LegalEvidencePack => matches!(tier, Tier::Professional | Tier::Forensic),
            _ => true,
        }
    }
}

impl fmt::Display for Addon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Addon {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Addon::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| CoreError::InvalidAddon(s.to_string()))
    }
}

/// Discount codes and their percentage off
const DISCOUNT_CODES: &[(&str, f64)] = &[("LAUNCH10", 10.0), ("PARTNER15", 15.0), ("VICTIM25", 25.0)];

/// Look up the percentage for a discount code (case-insensitive)
pub fn discount_percent(code: &str) -> Result<f64> {
    let normalized = code.trim().to_ascii_uppercase();
    DISCOUNT_CODES
        .iter()
        .find(|(c, _)| *c == normalized)
        .map(|(_, pct)| *pct)
        .ok_or_else(|| CoreError::InvalidDiscount(code.to_string()))
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Input to [`calculate_pricing`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRequest {
    pub tier: Tier,
    #[serde(default)]
    pub addons: Vec<Addon>,
    #[serde(default)]
    pub discount_code: Option<String>,
}

impl PricingRequest {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            addons: Vec::new(),
            discount_code: None,
        }
    }

    pub fn with_addon(mut self, addon: Addon) -> Self {
        self.addons.push(addon);
        self
    }

    pub fn with_discount_code(mut self, code: impl Into<String>) -> Self {
        self.discount_code = Some(code.into());
        self
    }
}

/// One priced addon in a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonLine {
    pub addon: Addon,
    pub price: f64,
}

/// Result of [`calculate_pricing`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingQuote {
    pub tier: Tier,
    pub base_price: f64,
    pub addons: Vec<AddonLine>,
    pub addon_total: f64,
    pub discount_code: Option<String>,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub total_price: f64,
    pub currency: String,
    pub delivery_hours: u32,
}

/// Price a tier with its addons and optional discount code
pub fn calculate_pricing(request: &PricingRequest) -> Result<PricingQuote> {
    let profile = request.tier.profile();

    let mut addons: Vec<AddonLine> = Vec::new();
    for addon in &request.addons {
        if !addon.available_for(request.tier) {
            return Err(CoreError::AddonNotAvailable {
                addon: addon.to_string(),
                tier: request.tier.to_string(),
            });
        }
        if addons.iter().any(|line| line.addon == *addon) {
            continue;
        }
        addons.push(AddonLine {
            addon: *addon,
            price: addon.price(),
        });
    }

    let addon_total = round2(addons.iter().map(|line| line.price).sum());

    let (discount_code, percent) = match request.discount_code.as_deref() {
        Some(code) if !code.trim().is_empty() => {
            (Some(code.trim().to_ascii_uppercase()), discount_percent(code)?)
        }
        _ => (None, 0.0),
    };

    let base_price = round2(profile.base_price);
    let discount_amount = round2((base_price + addon_total) * percent / 100.0);
    let total_price = round2(base_price + addon_total - discount_amount);

    let delivery_hours = if addons.iter().any(|l| l.addon == Addon::ExpeditedDelivery) {
        (profile.delivery_hours / 2).max(1)
    } else {
        profile.delivery_hours
    };

    Ok(PricingQuote {
        tier: request.tier,
        base_price,
        addons,
        addon_total,
        discount_code,
        discount_percent: percent,
        discount_amount,
        total_price,
        currency: CURRENCY.to_string(),
        delivery_hours,
    })
}

/// Public price list entry for an addon
#[derive(Debug, Clone, Serialize)]
pub struct AddonInfo {
    pub addon: Addon,
    pub price: f64,
    pub description: &'static str,
    pub tiers: Vec<Tier>,
}

/// Full public price list
#[derive(Debug, Clone, Serialize)]
pub struct PriceList {
    pub currency: &'static str,
    pub tiers: Vec<TierProfile>,
    pub addons: Vec<AddonInfo>,
}

pub fn price_list() -> PriceList {
    PriceList {
        currency: CURRENCY,
        tiers: Tier::ALL.iter().map(|t| t.profile()).collect(),
        addons: Addon::ALL
            .iter()
            .map(|a| AddonInfo {
                addon: *a,
                price: a.price(),
                description: a.description(),
                tiers: Tier::ALL.iter().copied().filter(|t| a.available_for(*t)).collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_identity_holds_for_every_tier() {
        for tier in Tier::ALL {
            let request = PricingRequest::new(tier)
                .with_addon(Addon::DarkWebScan)
                .with_addon(Addon::ExpeditedDelivery)
                .with_discount_code("launch10");
            let quote = calculate_pricing(&request).unwrap();

            assert_eq!(
                quote.total_price,
                round2(quote.base_price + quote.addon_total - quote.discount_amount)
            );
            assert_eq!(quote.total_price, round2(quote.total_price));
        }
    }

    #[test]
    fn test_plain_quote() {
        let quote = calculate_pricing(&PricingRequest::new(Tier::Professional)).unwrap();
        assert_eq!(quote.base_price, 399.0);
        assert_eq!(quote.addon_total, 0.0);
        assert_eq!(quote.discount_amount, 0.0);
        assert_eq!(quote.total_price, 399.0);
        assert_eq!(quote.delivery_hours, 24);
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn test_discount_rounding() {
        // (149 + 129) * 0.15 = 41.7
        let request = PricingRequest::new(Tier::Standard)
            .with_addon(Addon::DarkWebScan)
            .with_discount_code("PARTNER15");
        let quote = calculate_pricing(&request).unwrap();
        assert_eq!(quote.discount_amount, 41.7);
        assert_eq!(quote.total_price, 236.3);
        assert_eq!(quote.discount_code.as_deref(), Some("PARTNER15"));
    }

    #[test]
    fn test_duplicate_addons_counted_once() {
        let request = PricingRequest::new(Tier::Basic)
            .with_addon(Addon::AssetTracing)
            .with_addon(Addon::AssetTracing);
        let quote = calculate_pricing(&request).unwrap();
        assert_eq!(quote.addons.len(), 1);
        assert_eq!(quote.addon_total, 249.0);
    }

    #[test]
    fn test_expedited_halves_sla() {
        let request = PricingRequest::new(Tier::Basic).with_addon(Addon::ExpeditedDelivery);
        let quote = calculate_pricing(&request).unwrap();
        assert_eq!(quote.delivery_hours, 36);
    }

    #[test]
    fn test_legal_pack_restricted() {
        let request = PricingRequest::new(Tier::Basic).with_addon(Addon::LegalEvidencePack);
        assert!(matches!(
            calculate_pricing(&request),
            Err(CoreError::AddonNotAvailable { .. })
        ));

        let request = PricingRequest::new(Tier::Forensic).with_addon(Addon::LegalEvidencePack);
        assert!(calculate_pricing(&request).is_ok());
    }

    #[test]
    fn test_unknown_discount_rejected() {
        let request = PricingRequest::new(Tier::Basic).with_discount_code("FREEBIE");
        assert!(matches!(
            calculate_pricing(&request),
            Err(CoreError::InvalidDiscount(_))
        ));
    }

    #[test]
    fn test_blank_discount_ignored() {
        let request = PricingRequest::new(Tier::Basic).with_discount_code("  ");
        let quote = calculate_pricing(&request).unwrap();
        assert!(quote.discount_code.is_none());
        assert_eq!(quote.total_price, 49.0);
    }

    #[test]
    fn test_addon_from_str() {
        assert_eq!("dark_web_scan".parse::<Addon>().unwrap(), Addon::DarkWebScan);
        assert!("teleport".parse::<Addon>().is_err());
    }

    #[test]
    fn test_price_list() {
        let list = price_list();
        assert_eq!(list.tiers.len(), 4);
        assert_eq!(list.addons.len(), 5);
        let legal = list
            .addons
            .iter()
            .find(|a| a.addon == Addon::LegalEvidencePack)
            .unwrap();
        assert_eq!(legal.tiers, vec![Tier::Professional, Tier::Forensic]);
    }
}

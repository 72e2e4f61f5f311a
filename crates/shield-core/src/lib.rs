//! ScamShield Core
//!
//! Domain types shared by every ScamShield crate: service tiers and pricing,
//! the order record and its lifecycle state machine, target classification
//! and order identifiers. Nothing in here performs I/O.

pub mod error;
pub mod id;
pub mod order;
pub mod pricing;
pub mod status;
pub mod target;
pub mod tier;

pub use error::{CoreError, Result};
pub use id::generate_order_id;
pub use order::{
    DeliveryInfo, Finding, InvestigationFindings, NewOrder, Order, OrderResults, PaymentInfo,
    PaymentMethod, ReportArtifact, ReportBundle, RiskLevel, Severity, StatusChange,
};
pub use pricing::{
    calculate_pricing, price_list, round2, Addon, AddonLine, PriceList, PricingQuote,
    PricingRequest, CURRENCY,
};
pub use status::OrderStatus;
pub use target::{classify_target, is_valid_email, validate_target, TargetKind};
pub use tier::{ReportFormat, ReportSection, Tier, TierProfile};

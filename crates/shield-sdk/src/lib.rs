//! ScamShield SDK
//!
//! High-level API for running investigation orders: intake and pricing,
//! payment confirmation (manual or via provider webhooks), the staged
//! investigation and report pipeline, cancellation and status queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use shield_sdk::{CreateOrderRequest, OrderServiceBuilder, PaymentConfirmation};
//! use shield_core::{PaymentMethod, Tier};
//!
//! let service = OrderServiceBuilder::new().build();
//! let order = service
//!     .create_order(CreateOrderRequest::new("a@b.com", "example.com", Tier::Professional))
//!     .await?;
//! let order = service
//!     .confirm_payment(&order.order_id, PaymentConfirmation {
//!         method: PaymentMethod::Manual,
//!         payment_id: "manual-1".into(),
//!         amount: order.price,
//!     })
//!     .await?;
//! assert_eq!(order.progress, 100);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod webhook;

pub use builder::OrderServiceBuilder;
pub use config::ServiceConfig;
pub use error::{Result, SdkError};
pub use service::{CreateOrderRequest, OrderProcessingService, OrderStatusView, WebhookResult};
pub use store::{MemoryOrderStore, OrderStore};
pub use webhook::{parse_webhook, PaymentConfirmation, PaymentProvider, WebhookOutcome};

pub use shield_core::{
    Addon, Order, OrderStatus, PaymentMethod, PricingQuote, PricingRequest, ReportFormat, Tier,
};

//! REST API type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shield_core::{InvestigationFindings, OrderStatus, PaymentMethod, PricingQuote, Tier};
use shield_sdk::{OrderProcessingService, OrderStatusView};
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderProcessingService>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub investigator: String,
    pub timestamp: DateTime<Utc>,
}

fn default_tier() -> Tier {
    Tier::Basic
}

/// `POST /api/investigate`
#[derive(Debug, Deserialize)]
pub struct InvestigatePayload {
    pub target: String,
    #[serde(default = "default_tier")]
    pub tier: Tier,
}

#[derive(Debug, Serialize)]
pub struct InvestigateResponse {
    pub success: bool,
    pub target: String,
    pub tier: Tier,
    pub investigation: InvestigationFindings,
}

/// `POST /api/orders/create` response
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub status: OrderStatus,
    pub progress: u8,
    pub price: f64,
    pub quote: PricingQuote,
    pub payment_method: PaymentMethod,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Manual
}

/// `POST /api/orders/{id}/confirm`
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentPayload {
    pub amount: f64,
    /// Generated when absent
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default = "default_payment_method")]
    pub method: PaymentMethod,
}

/// `POST /api/orders/{id}/cancel`, body optional
#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderPayload {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response for state-changing order actions
#[derive(Debug, Serialize)]
pub struct OrderActionResponse {
    pub success: bool,
    pub order: OrderStatusView,
}

/// `GET /api/orders` query
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `POST /api/webhooks/{provider}` response
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_event: Option<String>,
}

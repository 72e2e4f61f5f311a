//! REST API implementation
//!
//! - types: Request/response type definitions
//! - extractors: Custom request extractors
//! - handlers: API endpoint handlers
//! - router: Router creation and configuration

mod extractors;
mod handlers;
mod router;
pub mod types;

pub use extractors::JsonExtractor;
pub use router::create_router;
pub use types::{
    AppState, CancelOrderPayload, ConfirmPaymentPayload, CreateOrderResponse, HealthResponse,
    InvestigatePayload, InvestigateResponse, ListOrdersQuery, OrderActionResponse,
    WebhookResponse,
};

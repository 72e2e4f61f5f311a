//! SDK error types

use shield_core::{CoreError, OrderStatus};
use shield_runtime::RuntimeError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Validation or lifecycle rule from the domain model
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Investigation or report stage failed
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Operation not allowed in the order's current status
    #[error("Cannot {operation} order {order_id} in status {status}")]
    InvalidState {
        order_id: String,
        status: OrderStatus,
        operation: &'static str,
    },

    /// Order was modified concurrently
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payment amount {received:.2} does not match order price {expected:.2}")]
    PaymentMismatch { expected: f64, received: f64 },

    #[error("Report not available: {0}")]
    ReportNotAvailable(String),

    #[error("Invalid webhook: {0}")]
    Webhook(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

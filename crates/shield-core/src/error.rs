//! Error types for ScamShield Core

use crate::status::OrderStatus;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid tier: {0} (expected basic, standard, professional or forensic)")]
    InvalidTier(String),

    #[error("Invalid addon: {0}")]
    InvalidAddon(String),

    #[error("Addon {addon} is not available for the {tier} tier")]
    AddonNotAvailable { addon: String, tier: String },

    #[error("Invalid discount code: {0}")]
    InvalidDiscount(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

pub type Result<T> = std::result::Result<T, CoreError>;

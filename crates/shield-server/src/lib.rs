//! ScamShield HTTP Server Library
//!
//! Exposes the server modules so integration tests can build the router
//! around an in-process order service.

pub mod api;
pub mod config;
pub mod error;
pub mod service;

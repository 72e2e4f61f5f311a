//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shield_sdk::SdkError;
use std::fmt;

/// Server error type
#[derive(Debug)]
pub enum ServerError {
    /// Unknown order or report
    NotFound(String),

    /// Invalid request
    InvalidRequest(String),

    /// Not allowed in the order's current state
    Conflict(String),

    /// Payment does not cover the order
    PaymentRequired(String),

    /// Internal server error
    InternalError(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServerError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ServerError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServerError::PaymentRequired(msg) => write!(f, "Payment required: {}", msg),
            ServerError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            ServerError::NotFound(msg)
            | ServerError::InvalidRequest(msg)
            | ServerError::Conflict(msg)
            | ServerError::PaymentRequired(msg)
            | ServerError::InternalError(msg) => msg,
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", error_message);
        }

        let body = Json(json!({
            "success": false,
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<SdkError> for ServerError {
    fn from(err: SdkError) -> Self {
        let msg = err.to_string();
        match err {
            SdkError::OrderNotFound(_) | SdkError::ReportNotAvailable(_) => {
                ServerError::NotFound(msg)
            }
            SdkError::Core(_) | SdkError::Webhook(_) => ServerError::InvalidRequest(msg),
            SdkError::InvalidState { .. } | SdkError::Conflict(_) => ServerError::Conflict(msg),
            SdkError::PaymentMismatch { .. } => ServerError::PaymentRequired(msg),
            SdkError::Runtime(_) | SdkError::ConfigError(_) => ServerError::InternalError(msg),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_core::{CoreError, OrderStatus};

    #[test]
    fn test_not_found_display() {
        let err = ServerError::NotFound("order SS-1".to_string());
        assert_eq!(err.to_string(), "Not found: order SS-1");
    }

    #[test]
    fn test_sdk_error_mapping() {
        let cases: Vec<(SdkError, StatusCode)> = vec![
            (SdkError::OrderNotFound("SS-1".into()), StatusCode::NOT_FOUND),
            (
                SdkError::Core(CoreError::InvalidEmail("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                SdkError::InvalidState {
                    order_id: "SS-1".into(),
                    status: OrderStatus::Delivered,
                    operation: "cancel",
                },
                StatusCode::CONFLICT,
            ),
            (SdkError::Conflict("version".into()), StatusCode::CONFLICT),
            (
                SdkError::PaymentMismatch {
                    expected: 49.0,
                    received: 4.9,
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (SdkError::Webhook("missing /type".into()), StatusCode::BAD_REQUEST),
            (SdkError::ConfigError("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (sdk_err, expected) in cases {
            let server_err: ServerError = sdk_err.into();
            assert_eq!(server_err.status(), expected, "{}", server_err);
        }
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let server_err: ServerError = anyhow::anyhow!("disk full").into();
        assert!(server_err.to_string().contains("Internal error"));
        assert!(server_err.to_string().contains("disk full"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ServerError::Conflict("already delivered".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServerError>();
    }
}

//! API endpoint handlers

use super::extractors::JsonExtractor;
use super::types::*;
use crate::error::ServerError;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use shield_core::{price_list, PriceList, PricingQuote, PricingRequest, ReportFormat};
use shield_sdk::{
    CreateOrderRequest, OrderStatusView, PaymentConfirmation, PaymentProvider, WebhookResult,
};
use tracing::info;

/// Health check endpoint
pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        investigator: state.service.investigator_name().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Tier table and addons
pub(super) async fn pricing() -> Json<PriceList> {
    Json(price_list())
}

pub(super) async fn quote(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<PricingRequest>,
) -> Result<Json<PricingQuote>, ServerError> {
    Ok(Json(state.service.quote(&payload)?))
}

/// Investigation preview without an order
pub(super) async fn investigate(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<InvestigatePayload>,
) -> Result<Json<InvestigateResponse>, ServerError> {
    info!(tier = %payload.tier, "Received investigation preview request");

    let investigation = state
        .service
        .preview_investigation(&payload.target, payload.tier)
        .await?;

    Ok(Json(InvestigateResponse {
        success: true,
        target: payload.target.trim().to_string(),
        tier: payload.tier,
        investigation,
    }))
}

pub(super) async fn create_order(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ServerError> {
    let order = state.service.create_order(payload).await?;

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: order.order_id,
        status: order.status,
        progress: order.progress,
        price: order.price,
        quote: order.quote,
        payment_method: order.payment_method,
    }))
}

pub(super) async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderStatusView>>, ServerError> {
    let orders = state.service.list_orders(query.status, query.limit).await?;
    Ok(Json(orders.iter().map(OrderStatusView::from).collect()))
}

pub(super) async fn order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderStatusView>, ServerError> {
    Ok(Json(state.service.order_status(&order_id).await?))
}

/// Manual payment confirmation
pub(super) async fn confirm_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    JsonExtractor(payload): JsonExtractor<ConfirmPaymentPayload>,
) -> Result<Json<OrderActionResponse>, ServerError> {
    let payment = PaymentConfirmation {
        method: payload.method,
        payment_id: payload
            .payment_id
            .unwrap_or_else(|| format!("manual-{}", uuid::Uuid::new_v4())),
        amount: payload.amount,
    };

    let order = state.service.confirm_payment(&order_id, payment).await?;
    Ok(Json(OrderActionResponse {
        success: true,
        order: OrderStatusView::from(&order),
    }))
}

pub(super) async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    body: Bytes,
) -> Result<Json<OrderActionResponse>, ServerError> {
    let payload: CancelOrderPayload = if body.iter().all(|b| b.is_ascii_whitespace()) {
        CancelOrderPayload::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ServerError::InvalidRequest(format!("Invalid JSON data: {}", e)))?
    };

    let order = state
        .service
        .cancel_order(&order_id, payload.reason)
        .await?;
    Ok(Json(OrderActionResponse {
        success: true,
        order: OrderStatusView::from(&order),
    }))
}

/// Stripe / PayPal webhook
pub(super) async fn payment_webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    JsonExtractor(event): JsonExtractor<serde_json::Value>,
) -> Result<Json<WebhookResponse>, ServerError> {
    let provider: PaymentProvider = provider.parse()?;

    let response = match state.service.process_webhook(provider, &event).await? {
        WebhookResult::Processed(order) => WebhookResponse {
            success: true,
            processed: true,
            order_id: Some(order.order_id.clone()),
            status: Some(order.status),
            ignored_event: None,
        },
        WebhookResult::Ignored(event_type) => WebhookResponse {
            success: true,
            processed: false,
            order_id: None,
            status: None,
            ignored_event: Some(event_type),
        },
    };
    Ok(Json(response))
}

/// Report file download
pub(super) async fn download_report(
    State(state): State<AppState>,
    Path((order_id, format)): Path<(String, String)>,
) -> Result<Response, ServerError> {
    let format: ReportFormat = format.parse().map_err(ServerError::InvalidRequest)?;

    let artifact = state.service.report_artifact(&order_id, format).await?;
    let content = tokio::fs::read(&artifact.path).await.map_err(|e| {
        ServerError::InternalError(format!("Cannot read report {}: {}", artifact.path, e))
    })?;

    info!(order_id = %order_id, format = %format, "Report downloaded");

    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        order_id,
        format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}

//! Order processing service
//!
//! Drives an order through its lifecycle:
//!
//! ```text
//! pending_payment -> payment_confirmed -> investigation_queued
//!   -> investigation_in_progress -> investigation_completed
//!   -> report_generating -> report_ready -> delivered
//! ```
//!
//! Confirming payment runs every remaining stage in turn. Each stage checks
//! the status it expects, records its transition and persists the order
//! before handing over to the next one. If a stage fails the order is moved
//! to `failed` with the error recorded.

use crate::config::ServiceConfig;
use crate::error::{Result, SdkError};
use crate::store::OrderStore;
use crate::webhook::{parse_webhook, PaymentConfirmation, PaymentProvider, WebhookOutcome};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shield_core::{
    calculate_pricing, generate_order_id, is_valid_email, validate_target, Addon, CoreError,
    DeliveryInfo, InvestigationFindings, NewOrder, Order, OrderStatus, PaymentInfo, PaymentMethod,
    PricingQuote, PricingRequest, ReportArtifact, ReportFormat, RiskLevel, Tier,
};
use shield_runtime::{InvestigationRequest, Investigator, ReportGenerator};
use std::future::Future;
use std::sync::Arc;

/// Allowed difference between a payment and the order price
const PAYMENT_TOLERANCE: f64 = 0.01;

fn default_investigation_type() -> String {
    "general".to_string()
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Manual
}

/// Input for [`OrderProcessingService::create_order`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_email: String,
    pub target: String,
    pub tier: Tier,
    #[serde(default = "default_investigation_type")]
    pub investigation_type: String,
    #[serde(default)]
    pub addons: Vec<Addon>,
    #[serde(default)]
    pub discount_code: Option<String>,
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

impl CreateOrderRequest {
    pub fn new(customer_email: impl Into<String>, target: impl Into<String>, tier: Tier) -> Self {
        Self {
            customer_email: customer_email.into(),
            target: target.into(),
            tier,
            investigation_type: default_investigation_type(),
            addons: Vec::new(),
            discount_code: None,
            payment_method: default_payment_method(),
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

/// Customer-facing view of an order's progress
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusView {
    pub order_id: String,
    pub status: OrderStatus,
    pub progress: u8,
    pub tier: Tier,
    pub target: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub download_links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Order> for OrderStatusView {
    fn from(order: &Order) -> Self {
        let delivery = order.results.delivery.as_ref();
        Self {
            order_id: order.order_id.clone(),
            status: order.status,
            progress: order.progress,
            tier: order.tier,
            target: order.target.clone(),
            price: order.price,
            created_at: order.created_at,
            updated_at: order.updated_at,
            risk_level: order.results.investigation.as_ref().map(|i| i.risk_level),
            error: order.error.clone(),
            download_links: delivery
                .map(|d| d.download_links.clone())
                .unwrap_or_default(),
            expires_at: delivery.map(|d| d.expires_at),
        }
    }
}

/// Result of handling a payment webhook
#[derive(Debug, Clone)]
pub enum WebhookResult {
    Processed(Box<Order>),
    Ignored(String),
}

/// Pipeline stages after payment
enum Stage {
    Queue,
    Start,
    Complete(Box<InvestigationFindings>),
    Report,
    Deliver,
}

/// Order processing service
pub struct OrderProcessingService {
    config: ServiceConfig,
    store: Arc<dyn OrderStore>,
    investigator: Arc<dyn Investigator>,
    reports: Arc<dyn ReportGenerator>,
}

impl OrderProcessingService {
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn OrderStore>,
        investigator: Arc<dyn Investigator>,
        reports: Arc<dyn ReportGenerator>,
    ) -> Self {
        Self {
            config,
            store,
            investigator,
            reports,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Name of the configured investigator
    pub fn investigator_name(&self) -> &str {
        self.investigator.name()
    }

    // ========== Order intake ==========

    /// Validate, price and store a new order awaiting payment
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order> {
        let email = request.customer_email.trim();
        if !is_valid_email(email) {
            return Err(CoreError::InvalidEmail(request.customer_email.clone()).into());
        }
        let (target, target_kind) = validate_target(&request.target)?;

        let quote = calculate_pricing(&PricingRequest {
            tier: request.tier,
            addons: request.addons.clone(),
            discount_code: request.discount_code.clone(),
        })?;
        let addons = quote.addons.iter().map(|line| line.addon).collect();

        let order = Order::new(NewOrder {
            order_id: generate_order_id(request.tier, &target),
            customer_email: email.to_string(),
            target,
            target_kind,
            investigation_type: request.investigation_type,
            quote,
            addons,
            payment_method: request.payment_method,
        });

        self.store.insert(order.clone()).await?;

        tracing::info!(
            order_id = %order.order_id,
            tier = %order.tier,
            target_kind = %order.target_kind,
            price = order.price,
            "Order created"
        );
        Ok(order)
    }

    /// Record payment and run the order to completion
    pub async fn confirm_payment(
        &self,
        order_id: &str,
        payment: PaymentConfirmation,
    ) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        Self::require(&order, OrderStatus::PendingPayment, "confirm payment for")?;

        if (payment.amount - order.price).abs() > PAYMENT_TOLERANCE {
            tracing::warn!(
                order_id = %order_id,
                expected = order.price,
                received = payment.amount,
                "Payment amount mismatch"
            );
            return Err(SdkError::PaymentMismatch {
                expected: order.price,
                received: payment.amount,
            });
        }

        order.payment = Some(PaymentInfo {
            method: payment.method,
            payment_id: payment.payment_id.clone(),
            amount: payment.amount,
            confirmed_at: Utc::now(),
        });
        order.payment_method = payment.method;
        order.transition(
            OrderStatus::PaymentConfirmed,
            Some(format!("{} payment {}", payment.method, payment.payment_id)),
        )?;
        self.store.update(&mut order).await?;

        tracing::info!(
            order_id = %order_id,
            method = %payment.method,
            amount = payment.amount,
            "Payment confirmed"
        );

        self.queue_investigation(order_id).await
    }

    /// Handle a provider webhook, confirming payment when it reports one
    pub async fn process_webhook(
        &self,
        provider: PaymentProvider,
        event: &serde_json::Value,
    ) -> Result<WebhookResult> {
        match parse_webhook(provider, event)? {
            WebhookOutcome::Confirmed { order_id, payment } => {
                tracing::info!(order_id = %order_id, provider = %provider, "Payment webhook received");

                // providers redeliver events; a payment we already recorded is acknowledged
                let existing = self.load(&order_id).await?;
                if existing
                    .payment
                    .as_ref()
                    .map_or(false, |p| p.payment_id == payment.payment_id)
                {
                    tracing::info!(
                        order_id = %order_id,
                        payment_id = %payment.payment_id,
                        status = %existing.status,
                        "Duplicate payment webhook"
                    );
                    return Ok(WebhookResult::Ignored(format!(
                        "duplicate payment {}",
                        payment.payment_id
                    )));
                }

                let order = self.confirm_payment(&order_id, payment).await?;
                Ok(WebhookResult::Processed(Box::new(order)))
            }
            WebhookOutcome::Ignored(event_type) => {
                tracing::debug!(provider = %provider, event_type = %event_type, "Ignoring webhook event");
                Ok(WebhookResult::Ignored(event_type))
            }
        }
    }

    // ========== Pipeline stages ==========

    pub async fn queue_investigation(&self, order_id: &str) -> Result<Order> {
        self.guarded(order_id, self.run_from(order_id, Stage::Queue))
            .await
    }

    /// Run the investigator and continue with the remaining stages
    pub async fn start_investigation(&self, order_id: &str) -> Result<Order> {
        self.guarded(order_id, self.run_from(order_id, Stage::Start))
            .await
    }

    /// Store findings for an in-progress investigation and continue
    pub async fn complete_investigation(
        &self,
        order_id: &str,
        findings: InvestigationFindings,
    ) -> Result<Order> {
        self.guarded(
            order_id,
            self.run_from(order_id, Stage::Complete(Box::new(findings))),
        )
        .await
    }

    pub async fn generate_report(&self, order_id: &str) -> Result<Order> {
        self.guarded(order_id, self.run_from(order_id, Stage::Report))
            .await
    }

    pub async fn prepare_delivery(&self, order_id: &str) -> Result<Order> {
        self.guarded(order_id, self.run_from(order_id, Stage::Deliver))
            .await
    }

    async fn run_from(&self, order_id: &str, stage: Stage) -> Result<Order> {
        let mut next = Some(stage);
        let mut last = None;

        while let Some(stage) = next.take() {
            let (order, following) = match stage {
                Stage::Queue => (self.step_queue(order_id).await?, Some(Stage::Start)),
                Stage::Start => {
                    let (order, findings) = self.step_start(order_id).await?;
                    (order, Some(Stage::Complete(Box::new(findings))))
                }
                Stage::Complete(findings) => (
                    self.step_complete(order_id, *findings).await?,
                    Some(Stage::Report),
                ),
                Stage::Report => (self.step_report(order_id).await?, Some(Stage::Deliver)),
                Stage::Deliver => (self.step_deliver(order_id).await?, None),
            };
            last = Some(order);
            next = following;
        }

        last.ok_or_else(|| SdkError::OrderNotFound(order_id.to_string()))
    }

    async fn step_queue(&self, order_id: &str) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        Self::require(&order, OrderStatus::PaymentConfirmed, "queue investigation for")?;

        order.transition(OrderStatus::InvestigationQueued, None)?;
        self.store.update(&mut order).await?;
        tracing::debug!(order_id = %order_id, "Investigation queued");
        Ok(order)
    }

    async fn step_start(&self, order_id: &str) -> Result<(Order, InvestigationFindings)> {
        let mut order = self.load(order_id).await?;
        Self::require(&order, OrderStatus::InvestigationQueued, "start investigation for")?;

        order.transition(
            OrderStatus::InvestigationInProgress,
            Some(format!("investigator: {}", self.investigator.name())),
        )?;
        self.store.update(&mut order).await?;

        tracing::info!(
            order_id = %order_id,
            investigator = self.investigator.name(),
            "Investigation started"
        );

        let findings = self
            .investigator
            .investigate(&InvestigationRequest::from_order(&order))
            .await?;
        Ok((order, findings))
    }

    async fn step_complete(&self, order_id: &str, findings: InvestigationFindings) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        Self::require(
            &order,
            OrderStatus::InvestigationInProgress,
            "complete investigation for",
        )?;

        tracing::info!(
            order_id = %order_id,
            findings = findings.findings.len(),
            risk_score = findings.risk_score,
            "Investigation complete"
        );

        order.results.investigation = Some(findings);
        order.transition(OrderStatus::InvestigationCompleted, None)?;
        self.store.update(&mut order).await?;
        Ok(order)
    }

    async fn step_report(&self, order_id: &str) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        Self::require(&order, OrderStatus::InvestigationCompleted, "generate report for")?;

        let findings = order.results.investigation.clone().ok_or_else(|| {
            SdkError::ReportNotAvailable(format!("order {} has no findings", order_id))
        })?;

        order.transition(OrderStatus::ReportGenerating, None)?;
        self.store.update(&mut order).await?;

        let bundle = self.reports.generate(&order, &findings).await?;
        order.results.report = Some(bundle);
        order.transition(OrderStatus::ReportReady, None)?;
        self.store.update(&mut order).await?;
        Ok(order)
    }

    async fn step_deliver(&self, order_id: &str) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        Self::require(&order, OrderStatus::ReportReady, "deliver")?;

        let download_links = order
            .results
            .report
            .as_ref()
            .map(|bundle| {
                bundle
                    .artifacts
                    .iter()
                    .map(|a| self.config.download_url(order_id, a.format.as_str()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let now = Utc::now();
        order.results.delivery = Some(DeliveryInfo {
            email: order.customer_email.clone(),
            download_links,
            expires_at: now + Duration::hours(self.config.download_ttl_hours),
            delivered_at: now,
        });
        order.transition(OrderStatus::Delivered, None)?;
        self.store.update(&mut order).await?;

        tracing::info!(order_id = %order_id, email = %order.customer_email, "Report delivered");
        Ok(order)
    }

    /// Await a stage chain, failing the order if it errors
    ///
    /// Requests made in the wrong state and concurrent modifications leave
    /// the order untouched.
    async fn guarded<F>(&self, order_id: &str, chain: F) -> Result<Order>
    where
        F: Future<Output = Result<Order>>,
    {
        match chain.await {
            Ok(order) => Ok(order),
            Err(err) => {
                let marks_failure = !matches!(
                    err,
                    SdkError::Conflict(_)
                        | SdkError::InvalidState { .. }
                        | SdkError::OrderNotFound(_)
                );
                if marks_failure {
                    self.mark_failed(order_id, &err).await;
                } else {
                    tracing::warn!(order_id = %order_id, error = %err, "Stage not applied");
                }
                Err(err)
            }
        }
    }

    async fn mark_failed(&self, order_id: &str, err: &SdkError) {
        tracing::error!(order_id = %order_id, error = %err, "Order processing failed");

        let mut order = match self.load(order_id).await {
            Ok(order) => order,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Could not load order to mark failed");
                return;
            }
        };
        if order.fail(err.to_string()).is_err() {
            return;
        }
        if let Err(e) = self.store.update(&mut order).await {
            tracing::error!(order_id = %order_id, error = %e, "Could not persist failed order");
        }
    }

    // ========== Cancellation and queries ==========

    /// Cancel an order that has not passed the investigation stage
    pub async fn cancel_order(&self, order_id: &str, reason: Option<String>) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        if !order.status.is_cancellable() {
            return Err(SdkError::InvalidState {
                order_id: order_id.to_string(),
                status: order.status,
                operation: "cancel",
            });
        }

        let note = reason.unwrap_or_else(|| "cancelled by customer".to_string());
        order.transition(OrderStatus::Cancelled, Some(note))?;
        self.store.update(&mut order).await?;

        tracing::info!(order_id = %order_id, "Order cancelled");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        self.load(order_id).await
    }

    pub async fn order_status(&self, order_id: &str) -> Result<OrderStatusView> {
        let order = self.load(order_id).await?;
        Ok(OrderStatusView::from(&order))
    }

    /// Orders, newest first, optionally filtered by status
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            orders.truncate(limit);
        }
        Ok(orders)
    }

    /// Report file for one format, once the report exists
    pub async fn report_artifact(
        &self,
        order_id: &str,
        format: ReportFormat,
    ) -> Result<ReportArtifact> {
        let order = self.load(order_id).await?;
        if !matches!(order.status, OrderStatus::ReportReady | OrderStatus::Delivered) {
            return Err(SdkError::ReportNotAvailable(format!(
                "order {} is {}",
                order_id, order.status
            )));
        }

        order
            .results
            .report
            .as_ref()
            .and_then(|bundle| bundle.artifact(format))
            .cloned()
            .ok_or_else(|| {
                SdkError::ReportNotAvailable(format!(
                    "{} report is not included in the {} tier",
                    format, order.tier
                ))
            })
    }

    // ========== Stateless helpers ==========

    pub fn quote(&self, request: &PricingRequest) -> Result<PricingQuote> {
        Ok(calculate_pricing(request)?)
    }

    /// Investigate a target without creating an order
    pub async fn preview_investigation(
        &self,
        target: &str,
        tier: Tier,
    ) -> Result<InvestigationFindings> {
        let (target, kind) = validate_target(target)?;
        tracing::debug!(target_kind = %kind, tier = %tier, "Preview investigation");
        let request = InvestigationRequest::preview(target, kind, tier);
        Ok(self.investigator.investigate(&request).await?)
    }

    async fn load(&self, order_id: &str) -> Result<Order> {
        self.store
            .get(order_id)
            .await?
            .ok_or_else(|| SdkError::OrderNotFound(order_id.to_string()))
    }

    fn require(order: &Order, expected: OrderStatus, operation: &'static str) -> Result<()> {
        if order.status != expected {
            return Err(SdkError::InvalidState {
                order_id: order.order_id.clone(),
                status: order.status,
                operation,
            });
        }
        Ok(())
    }
}

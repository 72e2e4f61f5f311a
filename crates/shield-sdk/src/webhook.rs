//! Payment provider webhooks
//!
//! Turns Stripe and PayPal event payloads into payment confirmations for the
//! order service. Events we do not act on are reported as ignored rather
//! than rejected so providers stop retrying them.

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shield_core::PaymentMethod;
use std::fmt;
use std::str::FromStr;

/// Payment provider sending webhooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Paypal,
}

impl PaymentProvider {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentProvider::Stripe => PaymentMethod::Stripe,
            PaymentProvider::Paypal => PaymentMethod::Paypal,
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentProvider::Stripe => "stripe",
            PaymentProvider::Paypal => "paypal",
        })
    }
}

impl FromStr for PaymentProvider {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stripe" => Ok(PaymentProvider::Stripe),
            "paypal" => Ok(PaymentProvider::Paypal),
            other => Err(SdkError::Webhook(format!("unknown payment provider: {}", other))),
        }
    }
}

/// Payment reported for an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub method: PaymentMethod,
    pub payment_id: String,
    pub amount: f64,
}

/// What a webhook asks us to do
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Confirmed {
        order_id: String,
        payment: PaymentConfirmation,
    },
    /// Event type we do not handle
    Ignored(String),
}

/// Interpret a provider event payload
pub fn parse_webhook(provider: PaymentProvider, event: &Value) -> Result<WebhookOutcome> {
    match provider {
        PaymentProvider::Stripe => parse_stripe(event),
        PaymentProvider::Paypal => parse_paypal(event),
    }
}

fn required_str<'a>(value: &'a Value, pointer: &str) -> Result<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SdkError::Webhook(format!("missing {}", pointer)))
}

fn parse_stripe(event: &Value) -> Result<WebhookOutcome> {
    let event_type = required_str(event, "/type")?;
    let object = event
        .pointer("/data/object")
        .ok_or_else(|| SdkError::Webhook("missing /data/object".to_string()))?;

    // amounts are in cents
    let cents = match event_type {
        "payment_intent.succeeded" => object
            .get("amount_received")
            .or_else(|| object.get("amount"))
            .and_then(Value::as_i64),
        "checkout.session.completed" => object.get("amount_total").and_then(Value::as_i64),
        other => return Ok(WebhookOutcome::Ignored(other.to_string())),
    }
    .ok_or_else(|| SdkError::Webhook(format!("{} event has no amount", event_type)))?;

    Ok(WebhookOutcome::Confirmed {
        order_id: required_str(object, "/metadata/order_id")?.to_string(),
        payment: PaymentConfirmation {
            method: PaymentMethod::Stripe,
            payment_id: required_str(object, "/id")?.to_string(),
            amount: cents as f64 / 100.0,
        },
    })
}

fn parse_paypal(event: &Value) -> Result<WebhookOutcome> {
    let event_type = required_str(event, "/event_type")?;
    if event_type != "PAYMENT.CAPTURE.COMPLETED" {
        return Ok(WebhookOutcome::Ignored(event_type.to_string()));
    }

    let amount = required_str(event, "/resource/amount/value")?;
    let amount: f64 = amount
        .parse()
        .map_err(|_| SdkError::Webhook(format!("invalid amount: {}", amount)))?;

    Ok(WebhookOutcome::Confirmed {
        order_id: required_str(event, "/resource/custom_id")?.to_string(),
        payment: PaymentConfirmation {
            method: PaymentMethod::Paypal,
            payment_id: required_str(event, "/resource/id")?.to_string(),
            amount,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stripe_payment_intent() {
        let event = json!({
            "type": "payment_intent.succeeded",
            "data": {"object": {
                "id": "pi_123",
                "amount_received": 39900,
                "metadata": {"order_id": "SS-PROF-20261015120000-0a1b2c3d"}
            }}
        });

        let outcome = parse_webhook(PaymentProvider::Stripe, &event).unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Confirmed {
                order_id: "SS-PROF-20261015120000-0a1b2c3d".to_string(),
                payment: PaymentConfirmation {
                    method: PaymentMethod::Stripe,
                    payment_id: "pi_123".to_string(),
                    amount: 399.0,
                },
            }
        );
    }

    #[test]
    fn test_stripe_checkout_session() {
        let event = json!({
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_1",
                "amount_total": 4900,
                "metadata": {"order_id": "SS-BASI-1"}
            }}
        });

        match parse_webhook(PaymentProvider::Stripe, &event).unwrap() {
            WebhookOutcome::Confirmed { payment, .. } => assert_eq!(payment.amount, 49.0),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_stripe_other_event_ignored() {
        let event = json!({"type": "charge.refunded", "data": {"object": {}}});
        assert_eq!(
            parse_webhook(PaymentProvider::Stripe, &event).unwrap(),
            WebhookOutcome::Ignored("charge.refunded".to_string())
        );
    }

    #[test]
    fn test_stripe_missing_order_id() {
        let event = json!({
            "type": "payment_intent.succeeded",
            "data": {"object": {"id": "pi_1", "amount": 100, "metadata": {}}}
        });
        let err = parse_webhook(PaymentProvider::Stripe, &event).unwrap_err();
        assert!(matches!(err, SdkError::Webhook(_)));
    }

    #[test]
    fn test_paypal_capture_completed() {
        let event = json!({
            "event_type": "PAYMENT.CAPTURE.COMPLETED",
            "resource": {
                "id": "CAP-9",
                "custom_id": "SS-STAN-1",
                "amount": {"currency_code": "USD", "value": "149.00"}
            }
        });

        match parse_webhook(PaymentProvider::Paypal, &event).unwrap() {
            WebhookOutcome::Confirmed { order_id, payment } => {
                assert_eq!(order_id, "SS-STAN-1");
                assert_eq!(payment.method, PaymentMethod::Paypal);
                assert_eq!(payment.amount, 149.0);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_paypal_bad_amount() {
        let event = json!({
            "event_type": "PAYMENT.CAPTURE.COMPLETED",
            "resource": {"id": "C", "custom_id": "SS-1", "amount": {"value": "lots"}}
        });
        assert!(parse_webhook(PaymentProvider::Paypal, &event).is_err());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Stripe".parse::<PaymentProvider>().unwrap(), PaymentProvider::Stripe);
        assert!("venmo".parse::<PaymentProvider>().is_err());
    }
}

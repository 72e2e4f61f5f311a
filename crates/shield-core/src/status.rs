//! Order lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an order
///
/// The happy path is strictly linear. `Failed` and `Cancelled` are side states
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    PaymentConfirmed,
    InvestigationQueued,
    InvestigationInProgress,
    InvestigationCompleted,
    ReportGenerating,
    ReportReady,
    Delivered,
    Failed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::PaymentConfirmed => "payment_confirmed",
            OrderStatus::InvestigationQueued => "investigation_queued",
            OrderStatus::InvestigationInProgress => "investigation_in_progress",
            OrderStatus::InvestigationCompleted => "investigation_completed",
            OrderStatus::ReportGenerating => "report_generating",
            OrderStatus::ReportReady => "report_ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Position on the happy path, `None` for side states
    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::PendingPayment => Some(0),
            OrderStatus::PaymentConfirmed => Some(1),
            OrderStatus::InvestigationQueued => Some(2),
            OrderStatus::InvestigationInProgress => Some(3),
            OrderStatus::InvestigationCompleted => Some(4),
            OrderStatus::ReportGenerating => Some(5),
            OrderStatus::ReportReady => Some(6),
            OrderStatus::Delivered => Some(7),
            OrderStatus::Failed | OrderStatus::Cancelled => None,
        }
    }

    /// Progress milestone reached on entering this status
    ///
    /// Side states have no milestone; the order keeps its last value.
    pub fn progress(&self) -> Option<u8> {
        match self {
            OrderStatus::PendingPayment => Some(0),
            OrderStatus::PaymentConfirmed => Some(10),
            OrderStatus::InvestigationQueued => Some(20),
            OrderStatus::InvestigationInProgress => Some(30),
            OrderStatus::InvestigationCompleted => Some(70),
            OrderStatus::ReportGenerating => Some(80),
            OrderStatus::ReportReady => Some(90),
            OrderStatus::Delivered => Some(100),
            OrderStatus::Failed | OrderStatus::Cancelled => None,
        }
    }

    /// Forward successor on the happy path
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::PendingPayment => Some(OrderStatus::PaymentConfirmed),
            OrderStatus::PaymentConfirmed => Some(OrderStatus::InvestigationQueued),
            OrderStatus::InvestigationQueued => Some(OrderStatus::InvestigationInProgress),
            OrderStatus::InvestigationInProgress => Some(OrderStatus::InvestigationCompleted),
            OrderStatus::InvestigationCompleted => Some(OrderStatus::ReportGenerating),
            OrderStatus::ReportGenerating => Some(OrderStatus::ReportReady),
            OrderStatus::ReportReady => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Failed | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Failed | OrderStatus::Cancelled
        )
    }

    /// Cancellation is allowed until the investigation has completed
    pub fn is_cancellable(&self) -> bool {
        match (self.rank(), OrderStatus::InvestigationCompleted.rank()) {
            (Some(current), Some(limit)) => current < limit,
            _ => false,
        }
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        match to {
            OrderStatus::Cancelled => self.is_cancellable(),
            OrderStatus::Failed => !self.is_terminal(),
            _ => self.next() == Some(to),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAPPY_PATH: [OrderStatus; 8] = [
        OrderStatus::PendingPayment,
        OrderStatus::PaymentConfirmed,
        OrderStatus::InvestigationQueued,
        OrderStatus::InvestigationInProgress,
        OrderStatus::InvestigationCompleted,
        OrderStatus::ReportGenerating,
        OrderStatus::ReportReady,
        OrderStatus::Delivered,
    ];

    #[test]
    fn test_happy_path_is_linear() {
        for pair in HAPPY_PATH.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0].can_transition_to(pair[1]));
            assert!(!pair[1].can_transition_to(pair[0]));
        }
        assert_eq!(OrderStatus::Delivered.next(), None);
    }

    #[test]
    fn test_progress_milestones() {
        let progress: Vec<u8> = HAPPY_PATH.iter().map(|s| s.progress().unwrap()).collect();
        assert_eq!(progress, vec![0, 10, 20, 30, 70, 80, 90, 100]);
        assert_eq!(OrderStatus::Failed.progress(), None);
        assert_eq!(OrderStatus::Cancelled.progress(), None);
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!OrderStatus::PendingPayment.can_transition_to(OrderStatus::InvestigationQueued));
        assert!(!OrderStatus::PaymentConfirmed.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_cancellable_states() {
        let cancellable: Vec<_> = HAPPY_PATH.iter().filter(|s| s.is_cancellable()).collect();
        assert_eq!(
            cancellable,
            vec![
                &OrderStatus::PendingPayment,
                &OrderStatus::PaymentConfirmed,
                &OrderStatus::InvestigationQueued,
                &OrderStatus::InvestigationInProgress,
            ]
        );
        assert!(!OrderStatus::Failed.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_failed_reachable_from_non_terminal() {
        for status in HAPPY_PATH.iter().take(7) {
            assert!(status.can_transition_to(OrderStatus::Failed));
        }
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Failed));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Failed));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&OrderStatus::InvestigationInProgress).unwrap();
        assert_eq!(json, "\"investigation_in_progress\"");
        assert_eq!(OrderStatus::ReportReady.to_string(), "report_ready");
    }
}

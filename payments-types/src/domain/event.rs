//! Lifecycle events published after a payment changes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{Payment, PaymentReference, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEventKind {
    #[serde(rename = "payment_created")]
    Created,
    #[serde(rename = "payment_processed")]
    Processed,
}

impl AsRef<str> for PaymentEventKind {
    fn as_ref(&self) -> &str {
        match self {
            Self::Created => "payment_created",
            Self::Processed => "payment_processed",
        }
    }
}

impl std::fmt::Display for PaymentEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// Message body published on the events topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub event: PaymentEventKind,
    pub reference: PaymentReference,
    pub order_id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
}

impl PaymentEvent {
    pub fn new(event: PaymentEventKind, payment: &Payment) -> Self {
        Self {
            event,
            reference: payment.reference.clone(),
            order_id: payment.order_id.clone(),
            user_id: payment.user_id.clone(),
            amount: payment.amount,
            status: payment.status,
        }
    }

    pub fn created(payment: &Payment) -> Self {
        Self::new(PaymentEventKind::Created, payment)
    }

    pub fn processed(payment: &Payment) -> Self {
        Self::new(PaymentEventKind::Processed, payment)
    }
}

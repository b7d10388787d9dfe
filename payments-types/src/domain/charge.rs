//! Gateway-facing charge request and its interpreted outcome.

use rust_decimal::Decimal;

use super::card::CardDetails;
use super::money::Currency;
use super::payment::{Payment, PaymentReference, PaymentStatus};

/// Everything the gateway needs for one processing attempt.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub reference: PaymentReference,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub buyer_email: String,
    pub card: CardDetails,
}

impl ChargeRequest {
    /// Builds the charge for a stored payment.
    pub fn for_payment(payment: &Payment, card: CardDetails) -> Self {
        Self {
            reference: payment.reference.clone(),
            description: payment.description.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
            buyer_email: payment.buyer_email.clone(),
            card,
        }
    }
}

/// The gateway's answer, already mapped onto the internal status vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOutcome {
    pub status: PaymentStatus,
    pub response_code: String,
    pub response_message: String,
    pub transaction_id: String,
    /// Gateway-side order id, canonicalized to a string
    pub order_id: Option<String>,
}

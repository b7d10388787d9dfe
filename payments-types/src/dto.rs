//! Data Transfer Objects (DTOs) for requests and responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CardDetails, PaymentReference};

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to record a new payment intent.
///
/// Missing text fields decode as empty strings so validation can name them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[serde(default)]
    #[schema(example = "u1")]
    pub user_id: String,
    #[serde(default)]
    #[schema(example = "o1")]
    pub order_id: String,
    /// Positive amount, as a JSON number or decimal string
    #[serde(default)]
    #[schema(value_type = String, example = "1000")]
    pub amount: Decimal,
    /// Defaults to the configured currency (COP)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "COP")]
    pub currency: Option<String>,
    /// Defaults to `credit_card`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    #[schema(example = "Order o1")]
    pub description: String,
    #[serde(default)]
    #[schema(example = "buyer@example.com")]
    pub buyer_email: String,
}

/// Card data for processing a pending payment.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    #[serde(default)]
    #[schema(example = "4111111111111111")]
    pub card_number: String,
    #[serde(default)]
    #[schema(example = "APPROVED")]
    pub card_holder: String,
    /// `MM/YY`, `MM/YYYY` or `YYYY/MM`
    #[serde(default)]
    #[schema(example = "12/30")]
    pub expiry_date: String,
    #[serde(default)]
    #[schema(example = "123")]
    pub cvv: String,
}

impl std::fmt::Debug for ProcessPaymentRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessPaymentRequest")
            .field(
                "card_number",
                &crate::domain::card::mask_card_number(&self.card_number),
            )
            .field("card_holder", &self.card_holder)
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"***")
            .finish()
    }
}

impl From<ProcessPaymentRequest> for CardDetails {
    fn from(req: ProcessPaymentRequest) -> Self {
        CardDetails {
            number: req.card_number,
            holder: req.card_holder,
            expiry: req.expiry_date,
            cvv: req.cvv,
        }
    }
}

/// Response after deleting a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletePaymentResponse {
    #[schema(example = "deleted")]
    pub status: String,
    pub reference: PaymentReference,
}

impl DeletePaymentResponse {
    pub fn deleted(reference: PaymentReference) -> Self {
        Self {
            status: "deleted".to_string(),
            reference,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhook DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Acknowledgement returned to the gateway's confirmation callback.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    #[schema(example = "ok")]
    pub status: String,
    pub message: String,
    /// Reference the callback was about, when it carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

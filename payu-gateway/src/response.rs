//! Decoding of the gateway's answer.

use serde::Deserialize;

use payments_types::{GatewayError, GatewayOutcome, PaymentStatus};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub transaction_response: Option<TransactionResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[serde(default)]
    pub order_id: Option<GatewayOrderId>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub response_code: Option<String>,
    #[serde(default)]
    pub response_message: Option<String>,
}

/// The gateway sends `orderId` either as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GatewayOrderId {
    Text(String),
    Number(serde_json::Number),
}

impl GatewayOrderId {
    /// Canonical string form. Integral floats lose their fraction.
    pub fn into_string(self) -> String {
        match self {
            GatewayOrderId::Text(s) => s,
            GatewayOrderId::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.to_string()
                } else if let Some(u) = n.as_u64() {
                    u.to_string()
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 => format!("{:.0}", f),
                        _ => n.to_string(),
                    }
                }
            }
        }
    }
}

/// Maps a gateway state to a payment status.
///
/// Anything that is not a final verdict leaves the payment pending.
pub fn map_state(state: &str) -> PaymentStatus {
    match state {
        "APPROVED" => PaymentStatus::Approved,
        "DECLINED" => PaymentStatus::Declined,
        "ERROR" => PaymentStatus::Error,
        _ => PaymentStatus::Pending,
    }
}

/// Parses a raw response body.
///
/// HTML pages (usually an authentication failure in front of the API) and
/// bodies that are not the gateway's JSON are protocol errors.
pub fn parse_response(body: &str) -> Result<GatewayResponse, GatewayError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        return Err(GatewayError::Protocol(
            "gateway returned HTML; check credentials, endpoint and account state".to_string(),
        ));
    }
    if trimmed.is_empty() {
        return Err(GatewayError::Protocol("empty response body".to_string()));
    }

    serde_json::from_str(trimmed)
        .map_err(|e| GatewayError::Protocol(format!("invalid gateway JSON: {}", e)))
}

impl GatewayResponse {
    /// Interprets the response.
    ///
    /// Without a `transactionResponse` the top-level code and error become the
    /// response fields and the payment stays pending.
    pub fn into_outcome(self) -> GatewayOutcome {
        match self.transaction_response {
            Some(tx) => GatewayOutcome {
                status: map_state(tx.state.as_deref().unwrap_or_default()),
                response_code: tx.response_code.unwrap_or_default(),
                response_message: tx.response_message.unwrap_or_default(),
                transaction_id: tx.transaction_id.unwrap_or_default(),
                order_id: tx.order_id.map(GatewayOrderId::into_string),
            },
            None => GatewayOutcome {
                status: PaymentStatus::Pending,
                response_code: self.code.unwrap_or_default(),
                response_message: self.error.unwrap_or_default(),
                transaction_id: String::new(),
                order_id: None,
            },
        }
    }
}

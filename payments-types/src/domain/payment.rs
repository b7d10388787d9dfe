//! Payment domain model.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::charge::GatewayOutcome;
use super::money::Currency;
use crate::error::DomainError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Unique, human-debuggable identifier of a payment.
///
/// Generated references look like `REF-1760698800123-3f9a1c2e7b4d`: a prefix,
/// the creation time in milliseconds and a random suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "REF-1760698800123-3f9a1c2e7b4d")]
pub struct PaymentReference(String);

impl PaymentReference {
    pub const PREFIX: &'static str = "REF";

    /// Generates a fresh reference.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}-{}-{}",
            Self::PREFIX,
            Utc::now().timestamp_millis(),
            &suffix[..12]
        ))
    }

    /// Parses a caller-supplied reference.
    pub fn parse(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        if s.trim().is_empty() || s.contains('/') || s.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidReference(s));
        }
        Ok(Self(s))
    }

    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PaymentReference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Settlement status of a payment.
///
/// `Pending` is the only non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Declined,
    Error,
}

impl PaymentStatus {
    /// Returns true once no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl AsRef<str> for PaymentStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Declined => "DECLINED",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "DECLINED" => Ok(Self::Declined),
            "ERROR" => Ok(Self::Error),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Validated input for a new payment, with defaults already applied.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: String,
    pub description: String,
    pub buyer_email: String,
}

impl NewPayment {
    /// Checks the creation rules, naming the first offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::validation("userId", "is required"));
        }
        if self.order_id.trim().is_empty() {
            return Err(DomainError::validation("orderId", "is required"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::validation(
                "amount",
                "must be greater than zero",
            ));
        }
        if self.buyer_email.trim().is_empty() {
            return Err(DomainError::validation("buyerEmail", "is required"));
        }
        if !EMAIL_RE.is_match(&self.buyer_email) {
            return Err(DomainError::validation(
                "buyerEmail",
                "must be a valid email address",
            ));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description", "is required"));
        }
        Ok(())
    }
}

/// A recorded payment intent and its settlement outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub reference: PaymentReference,
    #[schema(example = "u1")]
    pub user_id: String,
    #[schema(example = "o1")]
    pub order_id: String,
    /// Full-precision amount; formatted only when sent to the gateway
    #[schema(value_type = String, example = "1000")]
    pub amount: Decimal,
    pub currency: Currency,
    pub status: PaymentStatus,
    /// Gateway response code, empty until processed
    pub response_code: String,
    /// Gateway response message, empty until processed
    pub response_message: String,
    /// Gateway transaction id, empty until processed
    pub transaction_id: String,
    #[schema(example = "credit_card")]
    pub payment_method: String,
    pub description: String,
    #[schema(example = "buyer@example.com")]
    pub buyer_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new pending payment with a freshly generated reference.
    pub fn new(new: NewPayment) -> Result<Self, DomainError> {
        new.validate()?;

        let now = Utc::now();
        Ok(Self {
            reference: PaymentReference::generate(),
            user_id: new.user_id,
            order_id: new.order_id,
            amount: new.amount,
            currency: new.currency,
            status: PaymentStatus::Pending,
            response_code: String::new(),
            response_message: String::new(),
            transaction_id: String::new(),
            payment_method: new.payment_method,
            description: new.description,
            buyer_email: new.buyer_email,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true once the payment can no longer change.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Records a gateway outcome on a pending payment.
    ///
    /// Fails without touching the record if the payment is already terminal.
    pub fn apply_outcome(
        &mut self,
        outcome: &GatewayOutcome,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::AlreadySettled(self.status));
        }

        self.status = outcome.status;
        self.response_code = outcome.response_code.clone();
        self.response_message = outcome.response_message.clone();
        self.transaction_id = outcome.transaction_id.clone();
        self.updated_at = at;
        Ok(())
    }
}

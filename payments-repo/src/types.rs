//! Database row types for the SQL adapters.
//!
//! SQLite keeps amounts and timestamps as TEXT; Postgres uses NUMERIC and
//! TIMESTAMPTZ. Both rows convert into the same domain `Payment`.

use std::str::FromStr;

use sqlx::FromRow;

use payments_types::{Currency, Payment, PaymentReference, PaymentStatus, RepoError};

/// Column list shared by every SELECT and RETURNING clause.
pub const PAYMENT_COLUMNS: &str = "reference, user_id, order_id, amount, currency, status, \
     response_code, response_message, transaction_id, payment_method, description, \
     buyer_email, created_at, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs
// ─────────────────────────────────────────────────────────────────────────────

/// Payment row as stored by SQLite.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqlitePaymentRow {
    pub reference: String,
    pub user_id: String,
    pub order_id: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
    pub response_code: String,
    pub response_message: String,
    pub transaction_id: String,
    pub payment_method: String,
    pub description: String,
    pub buyer_email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Payment row as stored by Postgres.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgPaymentRow {
    pub reference: String,
    pub user_id: String,
    pub order_id: String,
    pub amount: rust_decimal::Decimal,
    pub currency: String,
    pub status: String,
    pub response_code: String,
    pub response_message: String,
    pub transaction_id: String,
    pub payment_method: String,
    pub description: String,
    pub buyer_email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

fn db_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::Database(e.to_string())
}

pub fn parse_status(s: &str) -> Result<PaymentStatus, RepoError> {
    PaymentStatus::from_str(s).map_err(db_err)
}

pub fn parse_currency(s: &str) -> Result<Currency, RepoError> {
    Currency::new(s).map_err(db_err)
}

pub fn parse_reference(s: String) -> Result<PaymentReference, RepoError> {
    PaymentReference::parse(s).map_err(db_err)
}

#[cfg(feature = "sqlite")]
pub fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(db_err)
}

/// Fixed-width RFC 3339, so TEXT ordering matches chronological ordering.
#[cfg(feature = "sqlite")]
pub fn format_timestamp(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
impl SqlitePaymentRow {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let amount = rust_decimal::Decimal::from_str(&self.amount).map_err(db_err)?;

        Ok(Payment {
            reference: parse_reference(self.reference)?,
            user_id: self.user_id,
            order_id: self.order_id,
            amount,
            currency: parse_currency(&self.currency)?,
            status: parse_status(&self.status)?,
            response_code: self.response_code,
            response_message: self.response_message,
            transaction_id: self.transaction_id,
            payment_method: self.payment_method,
            description: self.description,
            buyer_email: self.buyer_email,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

#[cfg(feature = "postgres")]
impl PgPaymentRow {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        Ok(Payment {
            reference: parse_reference(self.reference)?,
            user_id: self.user_id,
            order_id: self.order_id,
            amount: self.amount,
            currency: parse_currency(&self.currency)?,
            status: parse_status(&self.status)?,
            response_code: self.response_code,
            response_message: self.response_message,
            transaction_id: self.transaction_id,
            payment_method: self.payment_method,
            description: self.description,
            buyer_email: self.buyer_email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Maps an insert failure, turning a primary-key collision into `Conflict`.
pub fn map_insert_error(e: sqlx::Error, reference: &PaymentReference) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(format!("payment {} already exists", reference))
        }
        _ => RepoError::Database(e.to_string()),
    }
}

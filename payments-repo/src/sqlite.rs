//! SQLite store adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use payments_types::{
    GatewayOutcome, Payment, PaymentReference, PaymentStore, RepoError, Transition,
};

use crate::types::{PAYMENT_COLUMNS, SqlitePaymentRow, format_timestamp, map_insert_error};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite payment store.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_payments.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for SqliteRepo {
    async fn insert(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (reference, user_id, order_id, amount, currency, status,
                   response_code, response_message, transaction_id, payment_method, description,
                   buyer_email, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.reference.as_str())
        .bind(&payment.user_id)
        .bind(&payment.order_id)
        .bind(payment.amount.to_string())
        .bind(payment.currency.as_str())
        .bind(payment.status.as_ref())
        .bind(&payment.response_code)
        .bind(&payment.response_message)
        .bind(&payment.transaction_id)
        .bind(&payment.payment_method)
        .bind(&payment.description)
        .bind(&payment.buyer_email)
        .bind(format_timestamp(&payment.created_at))
        .bind(format_timestamp(&payment.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &payment.reference))?;

        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Payment>, RepoError> {
        let row: Option<SqlitePaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE reference = ?",
            PAYMENT_COLUMNS
        ))
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(SqlitePaymentRow::into_domain).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<SqlitePaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            PAYMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(SqlitePaymentRow::into_domain).collect()
    }

    async fn transition(
        &self,
        reference: &PaymentReference,
        outcome: &GatewayOutcome,
        at: DateTime<Utc>,
    ) -> Result<Transition, RepoError> {
        // The status guard in the WHERE clause is the compare-and-set.
        let row: Option<SqlitePaymentRow> = sqlx::query_as(&format!(
            r#"UPDATE payments
               SET status = ?, response_code = ?, response_message = ?, transaction_id = ?, updated_at = ?
               WHERE reference = ? AND status = 'PENDING'
               RETURNING {}"#,
            PAYMENT_COLUMNS
        ))
        .bind(outcome.status.as_ref())
        .bind(&outcome.response_code)
        .bind(&outcome.response_message)
        .bind(&outcome.transaction_id)
        .bind(format_timestamp(&at))
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        match row {
            Some(row) => Ok(Transition::Applied(row.into_domain()?)),
            None => match self.find_by_reference(reference).await? {
                Some(_) => Ok(Transition::Superseded),
                None => Err(RepoError::NotFound),
            },
        }
    }

    async fn delete(&self, reference: &PaymentReference) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM payments WHERE reference = ?"#)
            .bind(reference.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

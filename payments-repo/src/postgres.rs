//! PostgreSQL store adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use payments_types::{
    GatewayOutcome, Payment, PaymentReference, PaymentStore, RepoError, Transition,
};

use crate::types::{PAYMENT_COLUMNS, PgPaymentRow, map_insert_error};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL payment store.
///
/// Status transitions are single conditional UPDATE statements, so concurrent
/// processors never need row locks.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_payments_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for PostgresRepo {
    async fn insert(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (reference, user_id, order_id, amount, currency, status,
                   response_code, response_message, transaction_id, payment_method, description,
                   buyer_email, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(payment.reference.as_str())
        .bind(&payment.user_id)
        .bind(&payment.order_id)
        .bind(payment.amount)
        .bind(payment.currency.as_str())
        .bind(payment.status.as_ref())
        .bind(&payment.response_code)
        .bind(&payment.response_message)
        .bind(&payment.transaction_id)
        .bind(&payment.payment_method)
        .bind(&payment.description)
        .bind(&payment.buyer_email)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &payment.reference))?;

        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Payment>, RepoError> {
        let row: Option<PgPaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE reference = $1",
            PAYMENT_COLUMNS
        ))
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(PgPaymentRow::into_domain).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<PgPaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC, reference DESC",
            PAYMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(PgPaymentRow::into_domain).collect()
    }

    async fn transition(
        &self,
        reference: &PaymentReference,
        outcome: &GatewayOutcome,
        at: DateTime<Utc>,
    ) -> Result<Transition, RepoError> {
        let row: Option<PgPaymentRow> = sqlx::query_as(&format!(
            r#"UPDATE payments
               SET status = $1, response_code = $2, response_message = $3, transaction_id = $4, updated_at = $5
               WHERE reference = $6 AND status = 'PENDING'
               RETURNING {}"#,
            PAYMENT_COLUMNS
        ))
        .bind(outcome.status.as_ref())
        .bind(&outcome.response_code)
        .bind(&outcome.response_message)
        .bind(&outcome.transaction_id)
        .bind(at)
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
        let result = sqlx::query(r#"DELETE FROM payments WHERE reference = $1"#)
            .bind(reference.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

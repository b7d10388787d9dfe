//! Payment store port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, InMemory) will implement this trait.

use chrono::{DateTime, Utc};

use crate::domain::{GatewayOutcome, Payment, PaymentReference};
use crate::error::RepoError;

/// Result of a conditional status update.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The payment was still pending and now carries the outcome.
    Applied(Payment),
    /// Another attempt settled the payment first; nothing was written.
    Superseded,
}

/// Durable payment records keyed by reference.
///
/// `transition` MUST be an atomic compare-and-set on the stored status:
/// it only writes when the record is still `PENDING` at write time.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync + 'static {
    /// Inserts a new payment. Fails with `Conflict` on a duplicate reference.
    async fn insert(&self, payment: &Payment) -> Result<(), RepoError>;

    /// Loads a payment by reference.
    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Payment>, RepoError>;

    /// Lists a user's payments, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, RepoError>;

    /// Applies a gateway outcome if, and only if, the payment is still pending.
    ///
    /// Returns `NotFound` when no record exists for the reference.
    async fn transition(
        &self,
        reference: &PaymentReference,
        outcome: &GatewayOutcome,
        at: DateTime<Utc>,
    ) -> Result<Transition, RepoError>;

    /// Deletes a payment. Returns false if nothing was deleted.
    async fn delete(&self, reference: &PaymentReference) -> Result<bool, RepoError>;
}

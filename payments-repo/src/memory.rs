//! In-memory store adapter.
//!
//! Backed by a `DashMap`; the per-shard write lock taken by `get_mut` makes
//! the status compare-and-set atomic. Nothing survives a restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use payments_types::{
    GatewayOutcome, Payment, PaymentReference, PaymentStatus, PaymentStore, RepoError, Transition,
};

struct Slot {
    seq: u64,
    payment: Payment,
}

/// Process-local payment store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    payments: Arc<DashMap<PaymentReference, Slot>>,
    seq: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert(&self, payment: &Payment) -> Result<(), RepoError> {
        match self.payments.entry(payment.reference.clone()) {
            Entry::Occupied(_) => Err(RepoError::Conflict(format!(
                "payment {} already exists",
                payment.reference
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Slot {
                    seq: self.seq.fetch_add(1, Ordering::Relaxed),
                    payment: payment.clone(),
                });
                Ok(())
            }
        }
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Payment>, RepoError> {
        Ok(self.payments.get(reference).map(|s| s.payment.clone()))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, RepoError> {
        let mut matching: Vec<(DateTime<Utc>, u64, Payment)> = self
            .payments
            .iter()
            .filter(|s| s.payment.user_id == user_id)
            .map(|s| (s.payment.created_at, s.seq, s.payment.clone()))
            .collect();

        matching.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        Ok(matching.into_iter().map(|(_, _, p)| p).collect())
    }

    async fn transition(
        &self,
        reference: &PaymentReference,
        outcome: &GatewayOutcome,
        at: DateTime<Utc>,
    ) -> Result<Transition, RepoError> {
        let mut slot = self.payments.get_mut(reference).ok_or(RepoError::NotFound)?;

        if slot.payment.status != PaymentStatus::Pending {
            return Ok(Transition::Superseded);
        }

        slot.payment.apply_outcome(outcome, at)?;
        Ok(Transition::Applied(slot.payment.clone()))
    }

    async fn delete(&self, reference: &PaymentReference) -> Result<bool, RepoError> {
        Ok(self.payments.remove(reference).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payments_types::{Currency, NewPayment};
    use rust_decimal_macros::dec;

    fn payment(user_id: &str) -> Payment {
        Payment::new(NewPayment {
            user_id: user_id.to_string(),
            order_id: "o1".to_string(),
            amount: dec!(1000),
            currency: Currency::cop(),
            payment_method: "credit_card".to_string(),
            description: "x".to_string(),
            buyer_email: "a@b.com".to_string(),
        })
        .unwrap()
    }

    fn outcome(status: PaymentStatus, tx: &str) -> GatewayOutcome {
        GatewayOutcome {
            status,
            response_code: status.to_string(),
            response_message: String::new(),
            transaction_id: tx.to_string(),
            order_id: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        let p = payment("u1");
        store.insert(&p).await.unwrap();

        let found = store.find_by_reference(&p.reference).await.unwrap();
        assert_eq!(found, Some(p));
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        let p = payment("u1");
        store.insert(&p).await.unwrap();

        let result = store.insert(&p).await;
        assert!(matches!(result, Err(RepoError::Conflict(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_user_newest_first() {
        let store = MemoryStore::new();
        let first = payment("u1");
        let second = payment("u1");
        store.insert(&first).await.unwrap();
        store.insert(&payment("u2")).await.unwrap();
        store.insert(&second).await.unwrap();

        let listed = store.list_by_user("u1").await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].reference, second.reference);
        assert_eq!(listed[1].reference, first.reference);
        assert!(store.list_by_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transition_applies_once() {
        let store = MemoryStore::new();
        let p = payment("u1");
        store.insert(&p).await.unwrap();

        let first = store
            .transition(&p.reference, &outcome(PaymentStatus::Approved, "tx-1"), Utc::now())
            .await
            .unwrap();
        let second = store
            .transition(&p.reference, &outcome(PaymentStatus::Declined, "tx-2"), Utc::now())
            .await
            .unwrap();

        assert!(matches!(first, Transition::Applied(ref p) if p.status == PaymentStatus::Approved));
        assert_eq!(second, Transition::Superseded);

        let stored = store.find_by_reference(&p.reference).await.unwrap().unwrap();
        assert_eq!(stored.transaction_id, "tx-1");
    }

    #[tokio::test]
    async fn test_transition_unknown_reference() {
        let store = MemoryStore::new();
        let reference = PaymentReference::parse("REF-missing").unwrap();

        let result = store
            .transition(&reference, &outcome(PaymentStatus::Approved, "tx"), Utc::now())
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transitions_single_winner() {
        let store = MemoryStore::new();
        let p = payment("u1");
        store.insert(&p).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let reference = p.reference.clone();
            handles.push(tokio::spawn(async move {
                store
                    .transition(
                        &reference,
                        &outcome(PaymentStatus::Approved, &format!("tx-{}", i)),
                        Utc::now(),
                    )
                    .await
                    .unwrap()
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), Transition::Applied(_)) {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let p = payment("u1");
        store.insert(&p).await.unwrap();

        assert!(store.delete(&p.reference).await.unwrap());
        assert!(!store.delete(&p.reference).await.unwrap());
        assert!(store.is_empty());
    }
}

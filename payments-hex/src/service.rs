//! Payment Application Service
//!
//! Orchestrates the payment lifecycle through the store, gateway and
//! publisher ports. Contains NO infrastructure logic - pure business
//! orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};

use payments_types::{
    AppError, CardDetails, ChargeRequest, CreatePaymentRequest, Currency, DeletePaymentResponse,
    EventPublisher, NewPayment, Payment, PaymentEvent, PaymentGateway, PaymentReference,
    PaymentStatus, PaymentStore, ProcessPaymentRequest, Transition, WebhookAck,
};

/// Business defaults injected at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Currency applied when a create request omits one
    pub default_currency: Currency,
    /// Payment method applied when a create request omits one
    pub default_payment_method: String,
    /// Settled payments updated more recently than this cannot be deleted
    pub delete_grace: Duration,
    /// Queue that lifecycle events are published to
    pub events_topic: String,
    /// A publish still running after this is abandoned and logged
    pub publish_timeout: std::time::Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_currency: Currency::cop(),
            default_payment_method: "credit_card".to_string(),
            delete_grace: Duration::seconds(300),
            events_topic: "payment_events".to_string(),
            publish_timeout: std::time::Duration::from_secs(5),
        }
    }
}

/// Application service for the payment lifecycle.
///
/// Generic over the store and gateway adapters, injected at compile time.
/// This enables:
/// - Swapping persistence or gateway without code changes
/// - Testing with in-memory stores and stub gateways
/// - Compile-time checks for port implementation
///
/// The publisher is a trait object: events are best-effort and several
/// publishers may be chosen at runtime.
pub struct PaymentService<S: PaymentStore, G: PaymentGateway> {
    store: S,
    gateway: G,
    publisher: Arc<dyn EventPublisher>,
    config: ServiceConfig,
}

impl<S: PaymentStore, G: PaymentGateway> PaymentService<S, G> {
    /// Creates a new payment service with default business settings.
    pub fn new(store: S, gateway: G, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            store,
            gateway,
            publisher,
            config: ServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records a new pending payment and announces it.
    #[instrument(skip(self, req), fields(user_id = %req.user_id, order_id = %req.order_id))]
    pub async fn create(&self, req: CreatePaymentRequest) -> Result<Payment, AppError> {
        let currency = match req.currency.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Currency::new(code)?,
            _ => self.config.default_currency.clone(),
        };
        let payment_method = req
            .payment_method
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.config.default_payment_method.clone());

        let payment = Payment::new(NewPayment {
            user_id: req.user_id,
            order_id: req.order_id,
            amount: req.amount,
            currency,
            payment_method,
            description: req.description,
            buyer_email: req.buyer_email,
        })?;

        self.store.insert(&payment).await?;
        info!(reference = %payment.reference, amount = %payment.amount, currency = %payment.currency, "Payment created");

        self.publish(PaymentEvent::created(&payment)).await;
        Ok(payment)
    }

    /// Charges the card for a pending payment, at most once.
    ///
    /// Settled payments are never resubmitted: an approved one is returned
    /// as-is, a declined or failed one is a conflict. When two attempts race,
    /// the store's conditional update lets exactly one outcome through and the
    /// other attempt returns the winner's record.
    #[instrument(skip(self, req), fields(reference = %reference))]
    pub async fn process(
        &self,
        reference: &str,
        req: ProcessPaymentRequest,
    ) -> Result<Payment, AppError> {
        let reference = lookup_reference(reference)?;
        let card = CardDetails::from(req);
        card.validate()?;

        let payment = self.load(&reference).await?;
        match payment.status {
            PaymentStatus::Pending => {}
            PaymentStatus::Approved => {
                info!("Payment already approved, skipping gateway");
                return Ok(payment);
            }
            status => {
                warn!(status = %status, "Payment already processed");
                return Err(AppError::Conflict {
                    message: format!("Payment already processed with status: {}", status),
                    payment: Box::new(payment),
                });
            }
        }

        let charge = ChargeRequest::for_payment(&payment, card);
        let outcome = self.gateway.submit(&charge).await.inspect_err(|e| {
            warn!(retryable = e.is_retryable(), "Gateway submission failed: {}", e);
        })?;

        match self.store.transition(&reference, &outcome, Utc::now()).await? {
            Transition::Applied(updated) => {
                info!(
                    status = %updated.status,
                    transaction_id = %updated.transaction_id,
                    "Payment processed"
                );
                if updated.is_terminal() {
                    self.publish(PaymentEvent::processed(&updated)).await;
                }
                Ok(updated)
            }
            Transition::Superseded => {
                warn!(
                    discarded_status = %outcome.status,
                    "Concurrent attempt settled the payment first, discarding gateway result"
                );
                self.load(&reference).await
            }
        }
    }

    /// Gets a payment by reference.
    #[instrument(skip(self))]
    pub async fn get(&self, reference: &str) -> Result<Payment, AppError> {
        let reference = lookup_reference(reference)?;
        self.load(&reference).await
    }

    /// Lists a user's payments, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, AppError> {
        self.store.list_by_user(user_id).await.map_err(Into::into)
    }

    /// Deletes a settled payment outside the grace period.
    #[instrument(skip(self))]
    pub async fn delete(&self, reference: &str) -> Result<DeletePaymentResponse, AppError> {
        let reference = lookup_reference(reference)?;
        let payment = self.load(&reference).await?;

        // Terminal records never change again, so this check cannot go stale.
        if !payment.is_terminal() {
            return Err(AppError::BadRequest(format!(
                "Payment {} is still pending and cannot be deleted",
                reference
            )));
        }
        if Utc::now() - payment.updated_at < self.config.delete_grace {
            return Err(AppError::BadRequest(format!(
                "Payment {} was updated less than {} seconds ago and cannot be deleted yet",
                reference,
                self.config.delete_grace.num_seconds()
            )));
        }

        if !self.store.delete(&reference).await? {
            return Err(AppError::NotFound("Payment not found".into()));
        }

        info!("Payment deleted");
        Ok(DeletePaymentResponse::deleted(reference))
    }

    /// Acknowledges a gateway confirmation callback.
    ///
    /// The callback is logged only. It never changes a payment.
    #[instrument(skip(self, fields))]
    pub fn acknowledge_webhook(&self, fields: &HashMap<String, String>) -> WebhookAck {
        let pick = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| fields.get(*k))
                .filter(|v| !v.is_empty())
                .cloned()
        };
        let reference = pick(&["reference_sale", "referenceCode", "reference"]);
        let state = pick(&["state_pol", "transactionState", "state"]);

        info!(
            reference = reference.as_deref().unwrap_or("-"),
            state = state.as_deref().unwrap_or("-"),
            fields = fields.len(),
            "Gateway notification received"
        );

        WebhookAck {
            status: "ok".to_string(),
            message: "Notification received".to_string(),
            reference,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    async fn load(&self, reference: &PaymentReference) -> Result<Payment, AppError> {
        self.store
            .find_by_reference(reference)
            .await
            .map_err(AppError::from)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound("Payment not found".into())))
    }

    /// Publishes an event. Failures are logged, never returned.
    async fn publish(&self, event: PaymentEvent) {
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(event = %event.event, "Failed to encode event: {}", e);
                return;
            }
        };

        let publish = self
            .publisher
            .publish(&self.config.events_topic, &payload);
        match tokio::time::timeout(self.config.publish_timeout, publish).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(
                event = %event.event,
                reference = %event.reference,
                topic = %self.config.events_topic,
                "Failed to publish event: {}",
                e
            ),
            Err(_) => warn!(
                event = %event.event,
                reference = %event.reference,
                topic = %self.config.events_topic,
                timeout_ms = self.config.publish_timeout.as_millis() as u64,
                "Event publish timed out"
            ),
        }
    }
}

/// Parses a path reference for a lookup. A value that can never name a
/// stored payment is reported as not found.
fn lookup_reference(reference: &str) -> Result<PaymentReference, AppError> {
    PaymentReference::parse(reference).map_err(|_| AppError::NotFound("Payment not found".into()))
}

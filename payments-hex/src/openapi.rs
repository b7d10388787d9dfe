//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use payments_types::domain::{Currency, Payment, PaymentReference, PaymentStatus};
use payments_types::dto::{
    CreatePaymentRequest, DeletePaymentResponse, ProcessPaymentRequest, WebhookAck,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Create a pending payment
#[utoipa::path(
    post,
    path = "/api/payments/create",
    tag = "payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded as PENDING", body = Payment),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Store failure")
    )
)]
async fn create_payment() {}

/// Charge the card for a pending payment
///
/// An approved payment is returned unchanged without contacting the gateway.
#[utoipa::path(
    post,
    path = "/api/payments/{reference}/process",
    tag = "payments",
    request_body = ProcessPaymentRequest,
    params(
        ("reference" = String, Path, description = "Payment reference")
    ),
    responses(
        (status = 200, description = "Gateway outcome recorded", body = Payment),
        (status = 400, description = "Invalid card data, or payment already DECLINED or ERROR"),
        (status = 404, description = "Payment not found"),
        (status = 500, description = "Gateway or store failure; payment stays PENDING")
    )
)]
async fn process_payment() {}

/// Get a payment by reference
#[utoipa::path(
    get,
    path = "/api/payments/{reference}",
    tag = "payments",
    params(
        ("reference" = String, Path, description = "Payment reference")
    ),
    responses(
        (status = 200, description = "Payment found", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment() {}

/// List a user's payments, newest first
#[utoipa::path(
    get,
    path = "/api/payments/user/{user_id}",
    tag = "payments",
    params(
        ("user_id" = String, Path, description = "Owning user")
    ),
    responses(
        (status = 200, description = "Payments of the user", body = Vec<Payment>)
    )
)]
async fn list_user_payments() {}

/// Delete a settled payment
#[utoipa::path(
    delete,
    path = "/api/payments/{reference}",
    tag = "payments",
    params(
        ("reference" = String, Path, description = "Payment reference")
    ),
    responses(
        (status = 200, description = "Payment deleted", body = DeletePaymentResponse),
        (status = 400, description = "Payment is pending or was updated too recently"),
        (status = 404, description = "Payment not found")
    )
)]
async fn delete_payment() {}

/// Gateway confirmation callback (form or JSON body)
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    tag = "webhooks",
    request_body(content = inline(serde_json::Value), description = "Gateway notification fields"),
    responses(
        (status = 200, description = "Notification acknowledged", body = WebhookAck)
    )
)]
async fn payment_webhook() {}

/// OpenAPI documentation for the Payments API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Card Payment Lifecycle API",
        version = "1.0.0",
        description = "Creates payment records, charges cards through PayU and tracks each payment from PENDING to APPROVED, DECLINED or ERROR.\n\nAmounts are decimal strings. Processing a payment that is already APPROVED returns the stored record without a second charge.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_payment,
        process_payment,
        get_payment,
        list_user_payments,
        delete_payment,
        payment_webhook,
    ),
    components(
        schemas(
            Payment,
            PaymentReference,
            PaymentStatus,
            Currency,
            CreatePaymentRequest,
            ProcessPaymentRequest,
            DeletePaymentResponse,
            WebhookAck,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Payment lifecycle operations"),
        (name = "webhooks", description = "Gateway callbacks"),
    )
)]
pub struct ApiDoc;

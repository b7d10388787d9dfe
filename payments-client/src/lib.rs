//! # Payments Client SDK
//!
//! A typed Rust client for the Payments API.

use payments_types::{CreatePaymentRequest, DeletePaymentResponse, Payment, ProcessPaymentRequest};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Payments API client.
pub struct PaymentsClient {
    base_url: String,
    http: Client,
}

impl PaymentsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Records a new pending payment.
    pub async fn create_payment(&self, req: &CreatePaymentRequest) -> Result<Payment, ClientError> {
        self.post("/api/payments/create", req).await
    }

    /// Charges the card for a pending payment.
    pub async fn process_payment(
        &self,
        reference: &str,
        card: &ProcessPaymentRequest,
    ) -> Result<Payment, ClientError> {
        self.post(&format!("/api/payments/{}/process", reference), card)
            .await
    }

    /// Gets a payment by reference.
    pub async fn get_payment(&self, reference: &str) -> Result<Payment, ClientError> {
        self.get(&format!("/api/payments/{}", reference)).await
    }

    /// Lists a user's payments, newest first.
    pub async fn list_user_payments(&self, user_id: &str) -> Result<Vec<Payment>, ClientError> {
        self.get(&format!("/api/payments/user/{}", user_id)).await
    }

    /// Deletes a settled payment.
    pub async fn delete_payment(
        &self,
        reference: &str,
    ) -> Result<DeletePaymentResponse, ClientError> {
        let resp = self
            .http
            .delete(format!("{}/api/payments/{}", self.base_url, reference))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Path,
        http::StatusCode,
        routing::{get, post},
    };

    fn payment_json(reference: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "reference": reference,
            "userId": "u1",
            "orderId": "o1",
            "amount": "1000",
            "currency": "COP",
            "status": status,
            "responseCode": "",
            "responseMessage": "",
            "transactionId": "",
            "paymentMethod": "credit_card",
            "description": "Order o1",
            "buyerEmail": "buyer@example.com",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        })
    }

    async fn serve() -> String {
        let router = Router::new()
            .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy"})) }))
            .route(
                "/api/payments/create",
                post(|| async { (StatusCode::CREATED, Json(payment_json("REF-1", "PENDING"))) }),
            )
            .route(
                "/api/payments/{reference}/process",
                post(|Path(reference): Path<String>| async move {
                    Json(payment_json(&reference, "APPROVED"))
                }),
            )
            .route(
                "/api/payments/user/{user_id}",
                get(|| async { Json(vec![payment_json("REF-1", "PENDING")]) }),
            )
            .route(
                "/api/payments/{reference}",
                get(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        Json(serde_json::json!({"error": "Payment not found", "code": 404})),
                    )
                })
                .delete(|Path(reference): Path<String>| async move {
                    Json(serde_json::json!({"status": "deleted", "reference": reference}))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_client_creation() {
        let client = PaymentsClient::new("http://localhost:7000");
        assert_eq!(client.base_url, "http://localhost:7000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = PaymentsClient::new("http://localhost:7000/");
        assert_eq!(client.base_url, "http://localhost:7000");
    }

    #[tokio::test]
    async fn test_health() {
        let client = PaymentsClient::new(serve().await);
        assert!(client.health().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_and_process() {
        let client = PaymentsClient::new(serve().await);

        let created = client
            .create_payment(&CreatePaymentRequest::default())
            .await
            .unwrap();
        assert_eq!(created.reference.as_str(), "REF-1");

        let processed = client
            .process_payment("REF-1", &ProcessPaymentRequest::default())
            .await
            .unwrap();
        assert_eq!(processed.status.to_string(), "APPROVED");
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let client = PaymentsClient::new(serve().await);

        let payments = client.list_user_payments("u1").await.unwrap();
        assert_eq!(payments.len(), 1);

        let deleted = client.delete_payment("REF-9").await.unwrap();
        assert_eq!(deleted.status, "deleted");
        assert_eq!(deleted.reference.as_str(), "REF-9");
    }

    #[tokio::test]
    async fn test_api_error_carries_message() {
        let client = PaymentsClient::new(serve().await);

        let err = client.get_payment("REF-missing").await.unwrap_err();

        assert!(
            matches!(err, ClientError::Api { status: 404, ref message } if message == "Payment not found")
        );
    }
}

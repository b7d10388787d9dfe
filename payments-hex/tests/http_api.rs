//! Integration tests for the payments HTTP API.
//!
//! These tests drive the full router (extractors, error mapping, status
//! codes) against the in-memory store and a stub gateway.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use payments_hex::{PaymentService, ServiceConfig, inbound::HttpServer};
use payments_repo::{LogPublisher, MemoryStore};
use payments_types::{
    ChargeRequest, GatewayError, GatewayOutcome, PaymentGateway, PaymentStatus,
};
use tower::ServiceExt;

/// Gateway double answering every charge with one status.
struct StubGateway {
    status: PaymentStatus,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn submit(&self, _charge: &ChargeRequest) -> Result<GatewayOutcome, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GatewayOutcome {
            status: self.status,
            response_code: self.status.to_string(),
            response_message: String::new(),
            transaction_id: format!("tx-{}", n),
            order_id: Some(n.to_string()),
        })
    }
}

/// Helper to build a router whose gateway always answers `status`.
fn create_app(status: PaymentStatus, config: ServiceConfig) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = StubGateway {
        status,
        calls: calls.clone(),
    };
    let service = PaymentService::new(MemoryStore::new(), gateway, Arc::new(LogPublisher))
        .with_config(config);
    (HttpServer::new(service).router(), calls)
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn create_body() -> serde_json::Value {
    serde_json::json!({
        "userId": "u1",
        "orderId": "o1",
        "amount": 1000,
        "description": "Order o1",
        "buyerEmail": "buyer@example.com"
    })
}

fn card_body() -> serde_json::Value {
    serde_json::json!({
        "cardNumber": "4111111111111111",
        "cardHolder": "APPROVED",
        "expiryDate": "12/30",
        "cvv": "123"
    })
}

async fn create_payment(app: &Router) -> String {
    let (status, json) = send(
        app,
        json_request(Method::POST, "/api/payments/create", create_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["reference"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());

    let (status, json) = send(&app, empty_request(Method::GET, "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_create_returns_pending_payment() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());

    let (status, json) = send(
        &app,
        json_request(Method::POST, "/api/payments/create", create_body()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "PENDING");
    assert_eq!(json["currency"], "COP");
    assert_eq!(json["userId"], "u1");
    assert!(json["reference"].as_str().unwrap().starts_with("REF-"));
}

#[tokio::test]
async fn test_create_validation_error() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());
    let mut body = create_body();
    body["buyerEmail"] = "nope".into();

    let (status, json) = send(
        &app,
        json_request(Method::POST, "/api/payments/create", body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
    assert!(json["error"].as_str().unwrap().contains("buyerEmail"));
}

#[tokio::test]
async fn test_create_malformed_json_is_bad_request() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/payments/create")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
}

#[tokio::test]
async fn test_process_then_process_again() {
    let (app, calls) = create_app(PaymentStatus::Approved, ServiceConfig::default());
    let reference = create_payment(&app).await;
    let uri = format!("/api/payments/{}/process", reference);

    let (status, first) = send(&app, json_request(Method::POST, &uri, card_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "APPROVED");
    assert_eq!(first["transactionId"], "tx-1");

    let (status, second) = send(&app, json_request(Method::POST, &uri, card_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, first);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_process_declined_payment_again_is_conflict() {
    let (app, _) = create_app(PaymentStatus::Declined, ServiceConfig::default());
    let reference = create_payment(&app).await;
    let uri = format!("/api/payments/{}/process", reference);
    send(&app, json_request(Method::POST, &uri, card_body())).await;

    let (status, json) = send(&app, json_request(Method::POST, &uri, card_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "DECLINED");
    assert_eq!(json["payment"]["reference"], reference.as_str());
    assert!(json["error"].as_str().unwrap().contains("already processed"));
}

#[tokio::test]
async fn test_process_missing_card_field() {
    let (app, calls) = create_app(PaymentStatus::Approved, ServiceConfig::default());
    let reference = create_payment(&app).await;
    let mut body = card_body();
    body["cvv"] = "".into();

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/payments/{}/process", reference),
            body,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_process_unknown_payment() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());

    let (status, json) = send(
        &app,
        json_request(Method::POST, "/api/payments/REF-missing/process", card_body()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 404);
}

#[tokio::test]
async fn test_get_and_list() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());
    let reference = create_payment(&app).await;

    let (status, json) = send(
        &app,
        empty_request(Method::GET, &format!("/api/payments/{}", reference)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reference"], reference.as_str());

    let (status, json) = send(&app, empty_request(Method::GET, "/api/payments/user/u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, json) = send(
        &app,
        empty_request(Method::GET, "/api/payments/user/nobody"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_unknown_payment() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());

    let (status, _) = send(&app, empty_request(Method::GET, "/api/payments/REF-missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reference_with_space_is_not_found() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());

    let (status, json) = send(&app, empty_request(Method::GET, "/api/payments/a%20b")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 404);

    let (status, _) = send(&app, empty_request(Method::DELETE, "/api/payments/a%20b")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_pending_is_refused() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());
    let reference = create_payment(&app).await;

    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/payments/{}", reference)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_settled_payment() {
    let config = ServiceConfig {
        delete_grace: chrono::Duration::zero(),
        ..ServiceConfig::default()
    };
    let (app, _) = create_app(PaymentStatus::Approved, config);
    let reference = create_payment(&app).await;
    send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/payments/{}/process", reference),
            card_body(),
        ),
    )
    .await;

    let uri = format!("/api/payments/{}", reference);
    let (status, json) = send(&app, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "deleted");
    assert_eq!(json["reference"], reference.as_str());

    let (status, _) = send(&app, empty_request(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_webhook_accepts_form() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/payments/webhook")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from("reference_sale=REF-1&state_pol=4"))
        .unwrap();

    let (status, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["reference"], "REF-1");
}

#[tokio::test]
async fn test_webhook_accepts_json() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());

    let (status, json) = send(
        &app,
        json_request(
            Method::POST,
            "/api/payments/webhook",
            serde_json::json!({ "referenceCode": "REF-2", "state_pol": 6 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reference"], "REF-2");
}

#[tokio::test]
async fn test_webhook_with_unreadable_body_is_acknowledged() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/payments/webhook")
        .body(Body::from("garbage"))
        .unwrap();

    let (status, json) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = create_app(PaymentStatus::Approved, ServiceConfig::default());

    let (status, json) = send(&app, empty_request(Method::GET, "/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/payments/create"].is_object());
}

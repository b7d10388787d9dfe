//! HTTP request handlers.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{FromRequest, Path, Request, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use payments_types::{
    AppError, CreatePaymentRequest, PaymentGateway, PaymentStore, ProcessPaymentRequest,
};

use crate::PaymentService;

/// Application state shared across handlers.
pub struct AppState<S: PaymentStore, G: PaymentGateway> {
    pub service: PaymentService<S, G>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict { message, payment } => {
                let code = StatusCode::BAD_REQUEST;
                let body = serde_json::json!({
                    "error": message,
                    "code": code.as_u16(),
                    "status": payment.status,
                    "message": message,
                    "payment": payment,
                });
                return (code, Json(body)).into_response();
            }
            AppError::Gateway(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Payment processing failed: {}", err),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Gateway callback fields, read from a form or a JSON object.
///
/// Never rejects: an unreadable body yields no fields.
pub struct WebhookFields(pub HashMap<String, String>);

impl<St: Send + Sync> FromRequest<St> for WebhookFields {
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            return match Form::<HashMap<String, String>>::from_request(req, state).await {
                Ok(Form(fields)) => Ok(WebhookFields(fields)),
                Err(rejection) => {
                    tracing::warn!("Unreadable webhook form: {}", rejection.body_text());
                    Ok(WebhookFields(HashMap::new()))
                }
            };
        }

        match Json::<serde_json::Map<String, serde_json::Value>>::from_request(req, state).await {
            Ok(Json(object)) => Ok(WebhookFields(
                object
                    .into_iter()
                    .map(|(key, value)| match value {
                        serde_json::Value::String(s) => (key, s),
                        other => (key, other.to_string()),
                    })
                    .collect(),
            )),
            Err(rejection) => {
                tracing::warn!("Unreadable webhook body: {}", rejection.body_text());
                Ok(WebhookFields(HashMap::new()))
            }
        }
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Create a pending payment.
#[tracing::instrument(skip(state, payload))]
pub async fn create_payment<S: PaymentStore, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let payment = state.service.create(req).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Charge the card for a pending payment.
#[tracing::instrument(skip(state, payload))]
pub async fn process_payment<S: PaymentStore, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(reference): Path<String>,
    payload: Result<Json<ProcessPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let payment = state.service.process(&reference, req).await?;
    Ok(Json(payment))
}

/// Get a payment by reference.
#[tracing::instrument(skip(state))]
pub async fn get_payment<S: PaymentStore, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.get(&reference).await?;
    Ok(Json(payment))
}

/// List a user's payments, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_user_payments<S: PaymentStore, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.service.list_by_user(&user_id).await?;
    Ok(Json(payments))
}

/// Delete a settled payment.
#[tracing::instrument(skip(state))]
pub async fn delete_payment<S: PaymentStore, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.service.delete(&reference).await?;
    Ok(Json(deleted))
}

/// Gateway confirmation callback. Always acknowledged.
#[tracing::instrument(skip(state, fields))]
pub async fn payment_webhook<S: PaymentStore, G: PaymentGateway>(
    State(state): State<Arc<AppState<S, G>>>,
    WebhookFields(fields): WebhookFields,
) -> impl IntoResponse {
    Json(state.service.acknowledge_webhook(&fields))
}

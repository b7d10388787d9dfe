//! # Payments Hex
//!
//! Application service layer and HTTP adapter for the payments service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (orchestrates the payment lifecycle)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served by Swagger UI
//!
//! The service is generic over `S: PaymentStore` and `G: PaymentGateway`,
//! allowing different store and gateway implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{PaymentService, ServiceConfig};

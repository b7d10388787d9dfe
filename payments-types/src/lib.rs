//! # Payments Types
//!
//! Domain types and port traits for the card payment lifecycle service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Payment, PaymentReference, Currency, CardDetails)
//! - `ports/` - Trait definitions that adapters must implement (store, gateway, publisher)
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CardDetails, ChargeRequest, Currency, GatewayOutcome, NewPayment, Payment, PaymentEvent,
    PaymentEventKind, PaymentReference, PaymentStatus,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    EventPublisher, GatewayError, PaymentGateway, PaymentStore, PublishError, Transition,
};

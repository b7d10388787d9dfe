//! # PayU Gateway
//!
//! Outbound adapter that submits card transactions to the PayU Latam
//! payments API and maps its answers onto the internal status vocabulary.
//!
//! ## Modules
//!
//! - `normalize` - Card number, card network, expiry and amount normalization
//! - `signature` - Deterministic order signature (MD5 by default)
//! - `request` - Typed `SUBMIT_TRANSACTION` payload
//! - `response` - Response decoding and state mapping
//! - `client` - `PaymentGateway` implementation over reqwest
//!
//! # Example
//! ```
//! use payu_gateway::normalize::{classify_card_network, normalize_expiry, CardNetwork};
//!
//! assert_eq!(classify_card_network("4111 1111 1111 1111"), CardNetwork::Visa);
//! assert_eq!(normalize_expiry("12/25"), "2025/12");
//! ```

pub mod client;
pub mod config;
pub mod normalize;
pub mod request;
pub mod response;
pub mod signature;

pub use client::PayuGateway;
pub use config::PayuConfig;
pub use normalize::CardNetwork;
pub use signature::SignatureAlgorithm;

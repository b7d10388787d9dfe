//! Payment gateway port.
//!
//! Implementations submit a single card charge and interpret the answer.

use crate::domain::{ChargeRequest, GatewayOutcome};

/// Error type for gateway submissions.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Credentials or endpoint missing. Fatal until the deployment is fixed.
    #[error("Gateway is not configured: {0}")]
    Config(String),

    /// Network failure or timeout. The caller may retry.
    #[error("Gateway unreachable: {0}")]
    Transport(String),

    /// The gateway answered with something that is not its JSON protocol.
    #[error("Unexpected gateway response: {0}")]
    Protocol(String),
}

impl GatewayError {
    /// Returns true when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

/// Port trait for card payment gateways.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Submits one authorization-and-capture attempt.
    async fn submit(&self, charge: &ChargeRequest) -> Result<GatewayOutcome, GatewayError>;
}

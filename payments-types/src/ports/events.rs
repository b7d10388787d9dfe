//! Event publisher port.

/// Error type for event publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Broker unreachable: {0}")]
    Transport(String),

    #[error("Broker rejected message: {0}")]
    Rejected(String),

    #[error("Message was not routed to any queue on topic {0}")]
    NotRouted(String),
}

/// Fire-and-forget notification channel.
///
/// Delivery is best-effort: callers log failures and carry on.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

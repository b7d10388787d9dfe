//! Event publisher adapters.
//!
//! `RabbitHttpPublisher` talks to the RabbitMQ management HTTP API, so no
//! AMQP connection has to be kept alive. `LogPublisher` only writes the
//! event to the log and is used when no broker is configured.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use payments_types::{EventPublisher, PublishError};

/// Broker connection settings.
#[derive(Clone)]
pub struct RabbitConfig {
    /// Management API base URL, e.g. `http://rabbitmq:15672`
    pub api_url: String,
    pub user: String,
    pub pass: String,
    pub vhost: String,
    /// Upper bound for each management API request
    pub timeout: Duration,
}

impl RabbitConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            user: "guest".to_string(),
            pass: "guest".to_string(),
            vhost: "/".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.user = user.into();
        self.pass = pass.into();
        self
    }

    pub fn with_vhost(mut self, vhost: impl Into<String>) -> Self {
        self.vhost = vhost.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for RabbitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RabbitConfig")
            .field("api_url", &self.api_url)
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .field("vhost", &self.vhost)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct PublishBody<'a> {
    properties: MessageProperties,
    routing_key: &'a str,
    payload: &'a str,
    payload_encoding: &'static str,
}

#[derive(Serialize)]
struct MessageProperties {
    delivery_mode: u8,
    content_type: &'static str,
}

#[derive(Deserialize)]
struct PublishReply {
    routed: bool,
}

#[derive(Serialize)]
struct QueueDeclaration {
    durable: bool,
    auto_delete: bool,
}

/// Publishes persistent JSON messages to a durable queue through the default
/// exchange. Each queue is declared the first time it is published to.
pub struct RabbitHttpPublisher {
    config: RabbitConfig,
    client: reqwest::Client,
    declared: DashSet<String>,
}

impl RabbitHttpPublisher {
    pub fn new(config: RabbitConfig) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PublishError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            declared: DashSet::new(),
        })
    }

    /// Builds a management API URL, percent-encoding every segment so the
    /// default vhost `/` becomes `%2F`.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, PublishError> {
        let mut url = reqwest::Url::parse(&self.config.api_url)
            .map_err(|e| PublishError::Transport(format!("invalid broker URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PublishError::Transport("broker URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Declares a durable queue. Idempotent on the broker side.
    #[instrument(skip(self))]
    pub async fn declare_queue(&self, name: &str) -> Result<(), PublishError> {
        let url = self.endpoint(&["api", "queues", &self.config.vhost, name])?;

        let response = self
            .client
            .put(url)
            .basic_auth(&self.config.user, Some(&self.config.pass))
            .json(&QueueDeclaration {
                durable: true,
                auto_delete: false,
            })
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PublishError::Rejected(format!(
                "queue declaration returned HTTP {}",
                response.status()
            )));
        }

        self.declared.insert(name.to_string());
        debug!("Queue declared");
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for RabbitHttpPublisher {
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if !self.declared.contains(topic) {
            self.declare_queue(topic).await?;
        }

        let payload = std::str::from_utf8(payload)
            .map_err(|e| PublishError::Rejected(format!("payload is not UTF-8: {}", e)))?;
        let url = self.endpoint(&[
            "api",
            "exchanges",
            &self.config.vhost,
            "amq.default",
            "publish",
        ])?;

        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.user, Some(&self.config.pass))
            .json(&PublishBody {
                properties: MessageProperties {
                    delivery_mode: 2,
                    content_type: "application/json",
                },
                routing_key: topic,
                payload,
                payload_encoding: "string",
            })
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PublishError::Rejected(format!(
                "publish returned HTTP {}",
                response.status()
            )));
        }

        let reply: PublishReply = response
            .json()
            .await
            .map_err(|e| PublishError::Rejected(e.to_string()))?;
        if !reply.routed {
            return Err(PublishError::NotRouted(topic.to_string()));
        }

        debug!("Event published");
        Ok(())
    }
}

/// Publisher that only logs. Always succeeds.
#[derive(Debug, Clone, Default)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        match std::str::from_utf8(payload) {
            Ok(body) => info!(topic, event = body, "Event (no broker configured)"),
            Err(_) => warn!(topic, bytes = payload.len(), "Non UTF-8 event dropped"),
        }
        Ok(())
    }
}

//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use payments_repo::RabbitConfig;

/// Application configuration.
///
/// Gateway credentials are read separately by `PayuConfig::from_env`.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub default_currency: String,
    pub delete_grace_secs: i64,
    pub events_queue: String,
    /// Broker settings; `None` when `RABBITMQ_API_URL` is unset
    pub rabbitmq: Option<RabbitConfig>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "7000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let default_currency = env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "COP".to_string());

        let delete_grace_secs = env::var("PAYMENT_DELETE_GRACE_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("PAYMENT_DELETE_GRACE_SECS must be an integer: {}", e))?;

        let events_queue =
            env::var("PAYMENTS_EVENTS_QUEUE").unwrap_or_else(|_| "payment_events".to_string());

        let rabbit_timeout_secs: u64 = env::var("RABBITMQ_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("RABBITMQ_TIMEOUT_SECS must be a whole number: {}", e))?;

        let rabbitmq = env::var("RABBITMQ_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                RabbitConfig::new(url)
                    .with_credentials(
                        env::var("RABBITMQ_USER").unwrap_or_else(|_| "guest".to_string()),
                        env::var("RABBITMQ_PASS").unwrap_or_else(|_| "guest".to_string()),
                    )
                    .with_vhost(env::var("RABBITMQ_VHOST").unwrap_or_else(|_| "/".to_string()))
                    .with_timeout(Duration::from_secs(rabbit_timeout_secs))
            });

        Ok(Self {
            port,
            database_url,
            default_currency,
            delete_grace_secs,
            events_queue,
            rabbitmq,
        })
    }

    /// Delete grace period, rejecting values `chrono` cannot represent.
    pub fn delete_grace(&self) -> anyhow::Result<chrono::Duration> {
        chrono::Duration::try_seconds(self.delete_grace_secs).ok_or_else(|| {
            anyhow::anyhow!(
                "PAYMENT_DELETE_GRACE_SECS is out of range: {}",
                self.delete_grace_secs
            )
        })
    }

    /// Bound on a whole publish, which may take a queue declaration and a
    /// publish request.
    pub fn publish_timeout(&self) -> Duration {
        self.rabbitmq
            .as_ref()
            .map(|rabbit| rabbit.timeout * 2)
            .unwrap_or(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(delete_grace_secs: i64) -> Config {
        Config {
            port: 7000,
            database_url: "memory://".to_string(),
            default_currency: "COP".to_string(),
            delete_grace_secs,
            events_queue: "payment_events".to_string(),
            rabbitmq: None,
        }
    }

    #[test]
    fn test_delete_grace_in_range() {
        assert_eq!(
            config(300).delete_grace().unwrap(),
            chrono::Duration::seconds(300)
        );
    }

    #[test]
    fn test_delete_grace_out_of_range_is_error() {
        let err = config(i64::MAX).delete_grace().unwrap_err();
        assert!(err.to_string().contains("PAYMENT_DELETE_GRACE_SECS"));
    }

    #[test]
    fn test_publish_timeout_follows_broker_timeout() {
        let mut cfg = config(300);
        assert_eq!(cfg.publish_timeout(), Duration::from_secs(5));

        cfg.rabbitmq = Some(
            RabbitConfig::new("http://rabbitmq:15672").with_timeout(Duration::from_secs(3)),
        );
        assert_eq!(cfg.publish_timeout(), Duration::from_secs(6));
    }
}

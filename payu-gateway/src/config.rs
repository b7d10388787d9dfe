//! Gateway credentials and request defaults.

use std::time::Duration;

use payments_types::GatewayError;

use crate::signature::SignatureAlgorithm;

/// Sandbox endpoint, used whenever test mode is on and no URL is configured.
pub const SANDBOX_URL: &str = "https://sandbox.api.payulatam.com/payments-api/4.0/service.cgi";

/// Production endpoint.
pub const PRODUCTION_URL: &str = "https://api.payulatam.com/payments-api/4.0/service.cgi";

/// PayU merchant configuration.
///
/// Loaded once at startup. Missing credentials do not prevent startup; they
/// surface as [`GatewayError::Config`] on the first submission.
#[derive(Clone)]
pub struct PayuConfig {
    pub api_login: String,
    pub api_key: String,
    pub merchant_id: String,
    pub account_id: String,
    pub api_url: String,
    pub test_mode: bool,
    pub notify_url: String,
    pub timeout: Duration,
    pub signature_algorithm: SignatureAlgorithm,
    pub country: String,
    pub language: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl Default for PayuConfig {
    fn default() -> Self {
        Self {
            api_login: String::new(),
            api_key: String::new(),
            merchant_id: String::new(),
            account_id: String::new(),
            api_url: SANDBOX_URL.to_string(),
            test_mode: true,
            notify_url: "http://payment:7000/api/payments/webhook".to_string(),
            timeout: Duration::from_secs(30),
            signature_algorithm: SignatureAlgorithm::Md5,
            country: "CO".to_string(),
            language: "es".to_string(),
            ip_address: "127.0.0.1".to_string(),
            user_agent: "payments-service".to_string(),
        }
    }
}

impl PayuConfig {
    pub fn new(
        api_login: impl Into<String>,
        api_key: impl Into<String>,
        merchant_id: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            api_login: api_login.into(),
            api_key: api_key.into(),
            merchant_id: merchant_id.into(),
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    /// Loads the configuration from `PAYU_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let test_mode = var("PAYU_TEST_MODE")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        let api_url = var("PAYU_API_URL").unwrap_or_else(|| {
            if test_mode {
                SANDBOX_URL.to_string()
            } else {
                PRODUCTION_URL.to_string()
            }
        });

        let signature_algorithm = match var("PAYU_SIGNATURE_ALGORITHM") {
            Some(raw) => raw.parse::<SignatureAlgorithm>().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Falling back to MD5 order signatures");
                SignatureAlgorithm::Md5
            }),
            None => SignatureAlgorithm::Md5,
        };

        let timeout = var("PAYU_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            api_login: var("PAYU_API_LOGIN").unwrap_or_default(),
            api_key: var("PAYU_API_KEY").unwrap_or_default(),
            merchant_id: var("PAYU_MERCHANT_ID").unwrap_or_default(),
            account_id: var("PAYU_ACCOUNT_ID").unwrap_or_default(),
            api_url,
            test_mode,
            notify_url: var("PAYU_NOTIFY_URL").unwrap_or(defaults.notify_url),
            timeout,
            signature_algorithm,
            country: var("PAYU_COUNTRY").unwrap_or(defaults.country),
            language: var("PAYU_LANGUAGE").unwrap_or(defaults.language),
            ip_address: var("PAYU_IP_ADDRESS").unwrap_or(defaults.ip_address),
            user_agent: var("PAYU_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    /// Overrides the endpoint (tests, staging proxies).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Checks that every credential needed to sign and submit is present.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let required = [
            ("PAYU_API_LOGIN", &self.api_login),
            ("PAYU_API_KEY", &self.api_key),
            ("PAYU_MERCHANT_ID", &self.merchant_id),
            ("PAYU_ACCOUNT_ID", &self.account_id),
            ("PAYU_API_URL", &self.api_url),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Config(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }
}

impl std::fmt::Debug for PayuConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayuConfig")
            .field("api_login", &self.api_login)
            .field("api_key", &"[REDACTED]")
            .field("merchant_id", &self.merchant_id)
            .field("account_id", &self.account_id)
            .field("api_url", &self.api_url)
            .field("test_mode", &self.test_mode)
            .field("notify_url", &self.notify_url)
            .field("timeout", &self.timeout)
            .field("signature_algorithm", &self.signature_algorithm)
            .field("country", &self.country)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> PayuConfig {
        PayuConfig::new("pRRXKOl8ikMmt9u", "4Vj8eK4rloUd272L48hsrarnUA", "508029", "512321")
    }

    #[test]
    fn test_complete_config_is_valid() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_are_named() {
        let config = PayuConfig::new("login", "", "508029", "");
        let err = config.validate().unwrap_err();

        match err {
            GatewayError::Config(msg) => {
                assert!(msg.contains("PAYU_API_KEY"));
                assert!(msg.contains("PAYU_ACCOUNT_ID"));
                assert!(!msg.contains("PAYU_API_LOGIN"));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_points_at_sandbox() {
        let config = PayuConfig::default();
        assert_eq!(config.api_url, SANDBOX_URL);
        assert!(config.test_mode);
        assert_eq!(config.signature_algorithm, SignatureAlgorithm::Md5);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", configured());
        assert!(!rendered.contains("4Vj8eK4rloUd272L48hsrarnUA"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_with_api_url_overrides_endpoint() {
        let config = configured().with_api_url("http://127.0.0.1:9999/service.cgi");
        assert_eq!(config.api_url, "http://127.0.0.1:9999/service.cgi");
    }
}

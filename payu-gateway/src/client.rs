use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use payments_types::{ChargeRequest, GatewayError, GatewayOutcome, PaymentGateway};

use crate::config::PayuConfig;
use crate::request::build_submit_transaction;
use crate::response::parse_response;

/// PayU Latam adapter for the [`PaymentGateway`] port.
///
/// One submission per call. No retries: a transport failure is reported to
/// the caller, and the payment stays pending so the call can be repeated.
#[derive(Clone)]
pub struct PayuGateway {
    config: PayuConfig,
    client: reqwest::Client,
}

impl PayuGateway {
    pub fn new(config: PayuConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &PayuConfig {
        &self.config
    }
}

#[async_trait]
impl PaymentGateway for PayuGateway {
    #[instrument(
        skip(self, charge),
        fields(
            reference = %charge.reference,
            card = %charge.card.masked_number(),
            currency = %charge.currency
        )
    )]
    async fn submit(&self, charge: &ChargeRequest) -> Result<GatewayOutcome, GatewayError> {
        self.config.validate()?;

        let body = build_submit_transaction(&self.config, charge);
        debug!(
            network = %body.transaction.payment_method,
            amount = %body.transaction.order.additional_values.tx_value.value,
            test = body.test,
            "Submitting transaction to gateway"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gateway request failed: {}", e);
                GatewayError::Transport(e.to_string())
            })?;

        let http_status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Failed to read gateway response: {}", e);
            GatewayError::Transport(e.to_string())
        })?;

        let parsed = parse_response(&text).inspect_err(|e| {
            warn!(http_status = %http_status, "Unusable gateway response: {}", e);
        })?;
        let outcome = parsed.into_outcome();

        info!(
            status = %outcome.status,
            response_code = %outcome.response_code,
            transaction_id = %outcome.transaction_id,
            order_id = outcome.order_id.as_deref().unwrap_or(""),
            "Gateway answered"
        );

        Ok(outcome)
    }
}

//! `SUBMIT_TRANSACTION` request body.

use serde::Serialize;

use payments_types::ChargeRequest;

use crate::config::PayuConfig;
use crate::normalize::{classify_card_network, format_amount, normalize_card_number, normalize_expiry, CardNetwork};
use crate::signature::sign_with;

pub const COMMAND_SUBMIT_TRANSACTION: &str = "SUBMIT_TRANSACTION";
pub const TRANSACTION_TYPE: &str = "AUTHORIZATION_AND_CAPTURE";

#[derive(Debug, Serialize)]
pub struct SubmitTransaction {
    pub language: String,
    pub command: &'static str,
    pub merchant: Merchant,
    pub transaction: Transaction,
    pub test: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub api_login: String,
    pub api_key: String,
}

impl std::fmt::Debug for Merchant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merchant")
            .field("api_login", &self.api_login)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub order: Order,
    pub payer: Party,
    pub credit_card: CreditCard,
    pub extra_parameters: ExtraParameters,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payment_method: CardNetwork,
    pub payment_country: String,
    pub device_session_id: String,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub account_id: String,
    pub reference_code: String,
    pub description: String,
    pub language: String,
    pub signature: String,
    pub notify_url: String,
    pub additional_values: AdditionalValues,
    pub buyer: Party,
}

#[derive(Debug, Serialize)]
pub struct AdditionalValues {
    #[serde(rename = "TX_VALUE")]
    pub tx_value: TxValue,
}

#[derive(Debug, Serialize)]
pub struct TxValue {
    pub value: String,
    pub currency: String,
}

/// Buyer or payer identity. The card holder doubles as both.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub full_name: String,
    pub email_address: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub number: String,
    pub security_code: String,
    pub expiration_date: String,
    pub name: String,
}

impl std::fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditCard")
            .field(
                "number",
                &payments_types::domain::card::mask_card_number(&self.number),
            )
            .field("security_code", &"***")
            .field("expiration_date", &self.expiration_date)
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct ExtraParameters {
    #[serde(rename = "INSTALLMENTS_NUMBER")]
    pub installments_number: u32,
}

impl Default for ExtraParameters {
    fn default() -> Self {
        Self {
            installments_number: 1,
        }
    }
}

/// Builds the signed transaction body for one charge.
///
/// `TX_VALUE` and the signature both format the amount with `format_amount`.
pub fn build_submit_transaction(config: &PayuConfig, charge: &ChargeRequest) -> SubmitTransaction {
    let currency = charge.currency.as_str().to_string();
    let amount = format_amount(charge.amount, &charge.currency);
    let reference = charge.reference.as_str().to_string();

    let signature = sign_with(
        config.signature_algorithm,
        &config.api_key,
        &config.merchant_id,
        &reference,
        charge.amount,
        &charge.currency,
    );

    let party = Party {
        full_name: charge.card.holder.clone(),
        email_address: charge.buyer_email.clone(),
    };

    SubmitTransaction {
        language: config.language.clone(),
        command: COMMAND_SUBMIT_TRANSACTION,
        merchant: Merchant {
            api_login: config.api_login.clone(),
            api_key: config.api_key.clone(),
        },
        transaction: Transaction {
            order: Order {
                account_id: config.account_id.clone(),
                reference_code: reference,
                description: charge.description.clone(),
                language: config.language.clone(),
                signature,
                notify_url: config.notify_url.clone(),
                additional_values: AdditionalValues {
                    tx_value: TxValue {
                        value: amount,
                        currency,
                    },
                },
                buyer: party.clone(),
            },
            payer: party,
            credit_card: CreditCard {
                number: normalize_card_number(&charge.card.number),
                security_code: charge.card.cvv.clone(),
                expiration_date: normalize_expiry(&charge.card.expiry),
                name: charge.card.holder.clone(),
            },
            extra_parameters: ExtraParameters::default(),
            kind: TRANSACTION_TYPE,
            payment_method: classify_card_network(&charge.card.number),
            payment_country: config.country.clone(),
            device_session_id: format!("{:032x}", rand::random::<u128>()),
            ip_address: config.ip_address.clone(),
            user_agent: config.user_agent.clone(),
        },
        test: config.test_mode,
    }
}

//! Order signature sent with every transaction.
//!
//! The gateway recomputes the digest over
//! `apiKey~merchantId~referenceCode~amount~currency` and rejects the request
//! on mismatch. The amount is formatted here with the same rule that fills
//! `TX_VALUE`, so callers pass the decimal, never a string.

use std::str::FromStr;

use md5::Md5;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use payments_types::Currency;

use crate::normalize::format_amount;

/// Digest used for the order signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(format!("unsupported signature algorithm: {}", other)),
        }
    }
}

/// Builds the `~`-joined signature input.
pub fn signature_input(
    api_key: &str,
    merchant_id: &str,
    reference: &str,
    amount: &str,
    currency: &str,
) -> String {
    format!(
        "{}~{}~{}~{}~{}",
        api_key, merchant_id, reference, amount, currency
    )
}

/// MD5 signature as lowercase hex.
pub fn sign(
    api_key: &str,
    merchant_id: &str,
    reference: &str,
    amount: Decimal,
    currency: &Currency,
) -> String {
    sign_with(
        SignatureAlgorithm::Md5,
        api_key,
        merchant_id,
        reference,
        amount,
        currency,
    )
}

pub fn sign_with(
    algorithm: SignatureAlgorithm,
    api_key: &str,
    merchant_id: &str,
    reference: &str,
    amount: Decimal,
    currency: &Currency,
) -> String {
    let amount = format_amount(amount, currency);
    let input = signature_input(api_key, merchant_id, reference, &amount, currency.as_str());
    digest(algorithm, &input)
}

fn digest(algorithm: SignatureAlgorithm, input: &str) -> String {
    match algorithm {
        SignatureAlgorithm::Md5 => hex::encode(Md5::digest(input.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(input.as_bytes())),
    }
}

//! Gateway-canonical forms for card numbers, expiry dates and amounts.
//!
//! Everything here is pure. No Luhn or length validation is performed; card
//! data is assumed to have passed upstream checks.

use std::fmt;

use payments_types::Currency;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Expiry substituted when the input cannot be split into month and year.
pub const FALLBACK_EXPIRY: &str = "2025/12";

/// Strips spaces and hyphens from a card number.
pub fn normalize_card_number(raw: &str) -> String {
    raw.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Card networks the gateway distinguishes, named as it expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Diners,
    Discover,
    Unknown,
}

impl CardNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "VISA",
            CardNetwork::Mastercard => "MASTERCARD",
            CardNetwork::Amex => "AMEX",
            CardNetwork::Diners => "DINERS",
            CardNetwork::Discover => "DISCOVER",
            CardNetwork::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detects the card network from the IIN prefix. First match wins.
pub fn classify_card_network(number: &str) -> CardNetwork {
    let digits = normalize_card_number(number);

    if digits.starts_with('4') {
        CardNetwork::Visa
    } else if digits.starts_with('5') {
        CardNetwork::Mastercard
    } else if digits.starts_with("34") || digits.starts_with("37") {
        CardNetwork::Amex
    } else if digits.starts_with("36") || digits.starts_with("38") {
        CardNetwork::Diners
    } else if digits.starts_with('6') {
        CardNetwork::Discover
    } else {
        CardNetwork::Unknown
    }
}

/// Converts an expiry date to `YYYY/MM`.
///
/// Accepts `MM/YY`, `MM/YYYY` and the canonical `YYYY/MM`. Anything that does
/// not split into two non-empty parts yields [`FALLBACK_EXPIRY`].
pub fn normalize_expiry(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let parts: Vec<&str> = compact.split('/').collect();

    let (first, second) = match parts.as_slice() {
        [first, second] if !first.is_empty() && !second.is_empty() => (*first, *second),
        _ => {
            tracing::warn!(
                fallback = FALLBACK_EXPIRY,
                "Malformed card expiry, substituting fallback"
            );
            return FALLBACK_EXPIRY.to_string();
        }
    };

    if first.len() == 4 {
        return format!("{}/{}", first, pad_month(second));
    }

    let year = if second.len() == 2 {
        format!("20{}", second)
    } else {
        second.to_string()
    };
    format!("{}/{}", year, pad_month(first))
}

fn pad_month(month: &str) -> String {
    if month.len() == 1 {
        format!("0{}", month)
    } else {
        month.to_string()
    }
}

/// Renders an amount the way the gateway expects it.
///
/// COP goes out as a whole number, every other currency with exactly two
/// decimals. Midpoints round to even. The result feeds both the signature
/// and `TX_VALUE.value`, so the two can never disagree.
pub fn format_amount(amount: Decimal, currency: &Currency) -> String {
    let scale = if currency.has_minor_units() { 2 } else { 0 };
    let mut rounded = amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(scale);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_card_number_strips_separators() {
        assert_eq!(
            normalize_card_number("4111 1111-1111 1111"),
            "4111111111111111"
        );
    }

    #[test]
    fn test_classify_card_network() {
        assert_eq!(classify_card_network("4111111111111111"), CardNetwork::Visa);
        assert_eq!(
            classify_card_network("5500000000000004"),
            CardNetwork::Mastercard
        );
        assert_eq!(classify_card_network("341111111111111"), CardNetwork::Amex);
        assert_eq!(classify_card_network("371449635398431"), CardNetwork::Amex);
        assert_eq!(classify_card_network("36700102000000"), CardNetwork::Diners);
        assert_eq!(classify_card_network("6011000990139424"), CardNetwork::Discover);
        assert_eq!(
            classify_card_network("9999999999999999"),
            CardNetwork::Unknown
        );
        assert_eq!(classify_card_network(""), CardNetwork::Unknown);
    }

    #[test]
    fn test_classify_ignores_separators() {
        assert_eq!(classify_card_network(" 4111-1111"), CardNetwork::Visa);
    }

    #[test]
    fn test_network_serializes_upper_case() {
        let json = serde_json::to_string(&CardNetwork::Mastercard).unwrap();
        assert_eq!(json, "\"MASTERCARD\"");
    }

    #[test]
    fn test_expiry_short_year() {
        assert_eq!(normalize_expiry("12/25"), "2025/12");
    }

    #[test]
    fn test_expiry_long_year() {
        assert_eq!(normalize_expiry("07/2031"), "2031/07");
    }

    #[test]
    fn test_expiry_single_digit_month() {
        assert_eq!(normalize_expiry("3/27"), "2027/03");
    }

    #[test]
    fn test_expiry_already_canonical() {
        assert_eq!(normalize_expiry("2025/12"), "2025/12");
    }

    #[test]
    fn test_expiry_with_spaces() {
        assert_eq!(normalize_expiry(" 12 / 25 "), "2025/12");
    }

    #[test]
    fn test_malformed_expiry_uses_fallback() {
        assert_eq!(normalize_expiry("bad"), FALLBACK_EXPIRY);
        assert_eq!(normalize_expiry("12/25/30"), FALLBACK_EXPIRY);
        assert_eq!(normalize_expiry("/"), FALLBACK_EXPIRY);
        assert_eq!(normalize_expiry(""), "2025/12");
    }

    #[test]
    fn test_cop_amount_has_no_decimal_point() {
        let cop = Currency::cop();
        assert_eq!(format_amount(dec!(1000), &cop), "1000");
        assert_eq!(format_amount(dec!(1000.00), &cop), "1000");
        assert!(!format_amount(dec!(1234.4), &cop).contains('.'));
    }

    #[test]
    fn test_cop_amount_rounds_half_to_even() {
        let cop = Currency::cop();
        assert_eq!(format_amount(dec!(1000.5), &cop), "1000");
        assert_eq!(format_amount(dec!(1001.5), &cop), "1002");
        assert_eq!(format_amount(dec!(1000.51), &cop), "1001");
    }

    #[test]
    fn test_other_currencies_use_two_decimals() {
        let usd = Currency::new("USD").unwrap();
        assert_eq!(format_amount(dec!(12.5), &usd), "12.50");
        assert_eq!(format_amount(dec!(3), &usd), "3.00");
        assert_eq!(format_amount(dec!(10.125), &usd), "10.12");
    }
}

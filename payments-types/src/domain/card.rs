//! Card data supplied for a single processing attempt.

use crate::error::DomainError;

/// Raw card data as entered by the payer.
///
/// Never persisted. `Debug` masks the number and hides the security code so
/// the struct can travel through instrumented code safely.
#[derive(Clone)]
pub struct CardDetails {
    pub number: String,
    pub holder: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardDetails {
    /// Requires every card field to be present.
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            ("cardNumber", &self.number),
            ("cardHolder", &self.holder),
            ("expiryDate", &self.expiry),
            ("cvv", &self.cvv),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(DomainError::validation(field, "is required"));
            }
        }
        Ok(())
    }

    /// Returns the card number with everything but the last four digits hidden.
    pub fn masked_number(&self) -> String {
        mask_card_number(&self.number)
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &self.masked_number())
            .field("holder", &self.holder)
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

/// Masks a card number as `****1234`.
pub fn mask_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return "****".to_string();
    }
    let last4: String = digits[digits.len() - 4..].iter().collect();
    format!("****{}", last4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardDetails {
        CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            holder: "APPROVED".to_string(),
            expiry: "12/25".to_string(),
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_complete_card_is_valid() {
        assert!(card().validate().is_ok());
    }

    #[test]
    fn test_missing_cvv_fails() {
        let mut card = card();
        card.cvv = String::new();
        assert!(matches!(
            card.validate(),
            Err(DomainError::Validation { field: "cvv", .. })
        ));
    }

    #[test]
    fn test_debug_masks_sensitive_fields() {
        let rendered = format!("{:?}", card());
        assert!(rendered.contains("****1111"));
        assert!(!rendered.contains("4111 1111"));
        assert!(!rendered.contains("123"));
    }

    #[test]
    fn test_short_number_is_fully_masked() {
        assert_eq!(mask_card_number("12"), "****");
    }
}

//! Currency codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

/// ISO-style currency code, normalized to upper case.
///
/// Amounts are kept as full-precision decimals on the payment itself; the
/// currency only decides how they are rendered at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "COP")]
pub struct Currency(String);

impl Currency {
    /// Colombian peso. The gateway accepts no fractional units for it.
    pub const COP: &'static str = "COP";

    /// Parses a currency code, trimming and upper-casing it.
    pub fn new(code: impl AsRef<str>) -> Result<Self, DomainError> {
        let code = code.as_ref().trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(DomainError::validation("currency", "cannot be empty"));
        }
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(
                "currency",
                format!("{} is not an alphabetic currency code", code),
            ));
        }
        Ok(Self(code))
    }

    /// Returns the Colombian peso.
    pub fn cop() -> Self {
        Self(Self::COP.to_string())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns false for currencies the gateway only takes as whole units.
    pub fn has_minor_units(&self) -> bool {
        self.0 != Self::COP
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::cop()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

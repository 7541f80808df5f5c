//! Money types for the transfer engine
//!
//! All monetary values are `rust_decimal::Decimal` with two fractional
//! digits (cents). `StrictAmount` enforces format at the Serde boundary;
//! business validation (range, precision) happens later in `policy`.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of fractional digits carried by every monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Build a Decimal from an integer number of cents.
///
/// # Example
/// ```
/// use fundgate::money::cents;
/// assert_eq!(cents(250).to_string(), "2.50");
/// ```
#[inline]
pub fn cents(units: i64) -> Decimal {
    Decimal::new(units, MONEY_SCALE)
}

/// Check that a value does not carry sub-cent precision.
#[inline]
pub fn is_money_scale(value: Decimal) -> bool {
    value.normalize().scale() <= MONEY_SCALE
}

/// Rescale a value to exactly two fractional digits for display.
#[inline]
pub fn to_money(value: Decimal) -> Decimal {
    let mut v = value;
    v.rescale(MONEY_SCALE);
    v
}

// ============================================================================
// StrictAmount: Format-Validated Decimal at Serde Layer
// ============================================================================

/// Strict format amount - validates format during deserialization
///
/// - Rejects `.5` (must be `0.5`)
/// - Rejects `5.` (must be `5.0` or `5`)
/// - Rejects negative values
/// - Rejects empty strings and scientific notation
/// - Accepts JSON numbers for client convenience
#[derive(Debug, Clone, Copy)]
pub struct StrictAmount(Decimal);

impl StrictAmount {
    /// Get the inner Decimal value
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl std::ops::Deref for StrictAmount {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for StrictAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // Support both JSON number and JSON string
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            String(String),
            Number(Decimal),
        }

        let value = DecimalOrString::deserialize(deserializer)?;

        match value {
            DecimalOrString::String(s) => {
                if s.is_empty() {
                    return Err(D::Error::custom("Amount cannot be empty"));
                }
                if s.starts_with('.') {
                    return Err(D::Error::custom("Invalid format: use 0.5 not .5"));
                }
                if s.ends_with('.') {
                    return Err(D::Error::custom("Invalid format: use 5.0 not 5."));
                }
                if s.contains('e') || s.contains('E') {
                    return Err(D::Error::custom(
                        "Invalid format: scientific notation not allowed",
                    ));
                }
                if s.starts_with('+') {
                    return Err(D::Error::custom("Invalid format: + prefix not allowed"));
                }

                let d = Decimal::from_str(&s)
                    .map_err(|e| D::Error::custom(format!("Invalid decimal: {}", e)))?;

                if d.is_sign_negative() {
                    return Err(D::Error::custom("Amount cannot be negative"));
                }

                Ok(StrictAmount(d))
            }
            DecimalOrString::Number(d) => {
                if d.is_sign_negative() {
                    return Err(D::Error::custom("Amount cannot be negative"));
                }
                Ok(StrictAmount(d))
            }
        }
    }
}

impl Serialize for StrictAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as string to preserve precision
        serializer.serialize_str(&self.0.to_string())
    }
}

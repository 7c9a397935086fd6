//! # Decimal Text
//!
//! Exact conversion between decimal text (`"12.50"`, `"0.250"`) and scaled
//! integers. Both [`Money`](crate::Money) (2 places) and
//! [`Quantity`](crate::Quantity) (3 places) are built on this; no value ever
//! passes through floating point on its way in.
//!
//! ```text
//! "129.5"  ──parse_scaled(_, 2)──►  12950   (cents)
//! "0.25"   ──parse_scaled(_, 3)──►  250     (thousandths)
//! 12950    ──format_scaled(_, 2)─►  "129.50"
//! ```

use serde::de::{self, Deserializer, Visitor};
use std::fmt;
use thiserror::Error;

/// Decimal parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("value is empty")]
    Empty,

    #[error("'{0}' is not a decimal number")]
    Invalid(String),

    #[error("at most {places} decimal places are allowed")]
    TooPrecise { places: u32 },

    #[error("value is out of range")]
    Overflow,
}

/// Parses decimal text into an integer scaled by `10^places`.
///
/// Accepts an optional sign, digits, and an optional fractional part.
/// Fractional digits beyond `places` are accepted only when they are zeros
/// (`"12.500"` is a valid money amount, `"12.505"` is not).
///
/// ## Example
/// ```rust
/// use pizzatrack_core::decimal::parse_scaled;
///
/// assert_eq!(parse_scaled("12.5", 2), Ok(1250));
/// assert_eq!(parse_scaled("-0.75", 2), Ok(-75));
/// assert_eq!(parse_scaled("3", 3), Ok(3000));
/// assert!(parse_scaled("1.2345", 3).is_err());
/// ```
pub fn parse_scaled(text: &str, places: u32) -> Result<i64, DecimalError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DecimalError::Empty);
    }

    let (negative, digits) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (whole, mut fraction) = digits.split_once('.').unwrap_or((digits, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(DecimalError::Invalid(text.to_string()));
    }

    if fraction.len() > places as usize {
        let (kept, extra) = fraction.split_at(places as usize);
        if extra.bytes().any(|b| b != b'0') {
            return Err(DecimalError::TooPrecise { places });
        }
        fraction = kept;
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| DecimalError::Overflow)?
    };

    let mut fraction_value: i64 = 0;
    for b in fraction.bytes() {
        fraction_value = fraction_value * 10 + i64::from(b - b'0');
    }
    fraction_value *= 10_i64.pow(places - fraction.len() as u32);

    let value = whole_value
        .checked_mul(10_i64.pow(places))
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or(DecimalError::Overflow)?;

    Ok(if negative { -value } else { value })
}

/// Formats a scaled integer with exactly `places` fractional digits.
///
/// ## Example
/// ```rust
/// use pizzatrack_core::decimal::format_scaled;
///
/// assert_eq!(format_scaled(12950, 2), "129.50");
/// assert_eq!(format_scaled(-5, 3), "-0.005");
/// ```
pub fn format_scaled(value: i64, places: u32) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();

    if places == 0 {
        return format!("{}{}", sign, abs);
    }

    let scale = 10_u64.pow(places);
    format!(
        "{}{}.{:0width$}",
        sign,
        abs / scale,
        abs % scale,
        width = places as usize
    )
}

/// Converts a scaled integer to `f64` for JSON output only.
pub(crate) fn scaled_to_f64(value: i64, places: u32) -> f64 {
    value as f64 / 10_f64.powi(places as i32)
}

// =============================================================================
// Serde Support
// =============================================================================

/// Deserializes a JSON number or string into its decimal text.
///
/// JSON numbers arrive as `u64`/`i64`/`f64`; `f64` values are rendered with
/// Rust's shortest round-trip formatting, so `12.5` becomes `"12.5"` exactly.
pub(crate) fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalTextVisitor)
}

struct DecimalTextVisitor;

impl<'de> Visitor<'de> for DecimalTextVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or a numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        if !v.is_finite() {
            return Err(E::custom("decimal value must be finite"));
        }
        Ok(v.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

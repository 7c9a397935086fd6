//! # Quantity Module
//!
//! Fixed-point ingredient amounts: stock on hand and quantity per pizza.
//!
//! A `Quantity` counts thousandths of the ingredient's own unit of measure.
//! Kilos down to grams and litres down to millilitres are therefore exact:
//!
//! ```text
//! 0.250 kg cheese per pizza × 4 pizzas = 1.000 kg
//!   250 milli            × 4         = 1000 milli   (no rounding, ever)
//! ```
//!
//! The unit itself ("kg", "g", "lt", "unidad") lives on the ingredient; a
//! quantity is only meaningful next to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::decimal::{parse_scaled, scaled_to_f64, DecimalError};

/// Fractional digits kept for ingredient amounts.
pub const QUANTITY_PLACES: u32 = 3;

const MILLI_PER_UNIT: i64 = 1000;

/// Amount of an ingredient in thousandths of its unit of measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Whole units of measure (`from_units(10)` is 10 kg of a kg ingredient).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * MILLI_PER_UNIT)
    }

    /// Parses decimal text with up to three decimals (`"0.250"`, `"12"`).
    ///
    /// ## Example
    /// ```rust
    /// use pizzatrack_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::parse("0.25").unwrap().milli(), 250);
    /// assert!(Quantity::parse("0.0001").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, DecimalError> {
        parse_scaled(text, QUANTITY_PLACES).map(Quantity)
    }

    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Whole units, truncated toward zero.
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / MILLI_PER_UNIT
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Scales a per-pizza amount by the number of pizzas.
    #[inline]
    pub const fn times(&self, count: i64) -> Self {
        Quantity(self.0 * count)
    }

    #[inline]
    pub const fn checked_times(&self, count: i64) -> Option<Self> {
        match self.0.checked_mul(count) {
            Some(milli) => Some(Quantity(milli)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Quantity) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(milli) => Some(Quantity(milli)),
            None => None,
        }
    }

    /// Lossy `f64` view used only when writing JSON numbers.
    pub fn to_f64(&self) -> f64 {
        scaled_to_f64(self.0, QUANTITY_PLACES)
    }
}

/// Shortest exact decimal: `3`, `0.25`, `1.005`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MILLI_PER_UNIT as u64;
        let fraction = abs % MILLI_PER_UNIT as u64;

        if fraction == 0 {
            return write!(f, "{}{}", sign, whole);
        }

        let digits = format!("{:03}", fraction);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

/// Serde adapter writing quantities as JSON decimal numbers (`0.25`) and
/// reading them from numbers or numeric strings.
pub mod decimal {
    use super::Quantity;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Quantity, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Quantity, D::Error> {
        let text = crate::decimal::deserialize_text(deserializer)?;
        Quantity::parse(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_units() {
        assert_eq!(Quantity::parse("3").unwrap(), Quantity::from_units(3));
        assert_eq!(Quantity::parse("0.250").unwrap().milli(), 250);
        assert_eq!(Quantity::parse("12.5").unwrap().whole_units(), 12);
        assert_eq!(
            Quantity::parse("0.0005"),
            Err(DecimalError::TooPrecise { places: 3 })
        );
    }

    #[test]
    fn test_per_pizza_amounts_scale_exactly() {
        let cheese = Quantity::parse("0.125").unwrap();
        assert_eq!(cheese.times(8), Quantity::from_units(1));

        let sauce = Quantity::parse("0.1").unwrap();
        let total = sauce.times(3) + sauce.times(7);
        assert_eq!(total, Quantity::from_units(1));
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        assert_eq!(Quantity::from_units(10).to_string(), "10");
        assert_eq!(Quantity::from_milli(250).to_string(), "0.25");
        assert_eq!(Quantity::from_milli(1005).to_string(), "1.005");
        assert_eq!(Quantity::from_milli(-1500).to_string(), "-1.5");
        assert_eq!(Quantity::zero().to_string(), "0");
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(Quantity::from_milli(i64::MAX).checked_times(2), None);
        assert_eq!(
            Quantity::from_milli(i64::MAX).checked_add(Quantity::from_milli(1)),
            None
        );
        assert_eq!(
            Quantity::from_units(2).checked_add(Quantity::from_milli(500)),
            Some(Quantity::from_milli(2500))
        );
    }

    #[test]
    fn test_decimal_serde_adapter() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Probe {
            #[serde(with = "super::decimal")]
            stock: Quantity,
        }

        let probe: Probe = serde_json::from_str(r#"{"stock": 7.5}"#).unwrap();
        assert_eq!(probe.stock.milli(), 7500);

        let probe: Probe = serde_json::from_str(r#"{"stock": "0.030"}"#).unwrap();
        assert_eq!(probe.stock.milli(), 30);

        let json = serde_json::to_value(Probe { stock: Quantity::from_milli(4000) }).unwrap();
        assert_eq!(json["stock"], serde_json::json!(4.0));
    }
}

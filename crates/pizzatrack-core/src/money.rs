//! # Money Module
//!
//! The `Money` type: menu prices, line totals and sale totals as integer
//! cents.
//!
//! ## Representation
//! ```text
//! console sends        parsed as           stored as          shown as
//! ─────────────        ─────────           ─────────          ────────
//! 129.5       ──────►  "129.5"   ──────►   12950 cents  ───►  $129.50
//! "$1,299.50" ──────►  strip $ and ,  ──►  129950 cents ───►  $1299.50
//! 0.005       ──────►  rejected (sub-cent)
//! ```
//!
//! Cart totals and the daily report are sums of `i64` cents, so the report
//! total equals the sum of the receipts to the cent.
//!
//! ## Usage
//! ```rust
//! use pizzatrack_core::money::Money;
//!
//! let price = Money::parse("$1,299.50").unwrap();
//! assert_eq!(price.cents(), 129950);
//!
//! let line_total = price * 2;
//! assert_eq!(line_total.to_string(), "$2599.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::decimal::{format_scaled, parse_scaled, scaled_to_f64, DecimalError};

/// Fractional digits of the currency.
pub const CURRENCY_PLACES: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: a recipe price cannot be negative, but differences can
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Default serde is cents**: JSON endpoints opt into decimal numbers with
///   `#[serde(with = "pizzatrack_core::money::decimal")]`
///
/// ## Where Money is Used
/// ```text
/// Recipe.unit_price ──► CartLine.unit_price ──► line total ──► Sale.total
///                            ▲
///                            └── price charged at the counter, may differ
///                                from the menu price
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use pizzatrack_core::money::Money;
    ///
    /// let price = Money::from_cents(12950); // $129.50
    /// assert_eq!(price.cents(), 12950);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    /// Parses a price typed by a person or sent by the console.
    ///
    /// A leading `$` and thousands separators (`,`) are stripped, the way the
    /// inventory form accepts them. At most two decimal places.
    ///
    /// ## Example
    /// ```rust
    /// use pizzatrack_core::money::Money;
    ///
    /// assert_eq!(Money::parse("45").unwrap().cents(), 4500);
    /// assert_eq!(Money::parse("$1,200.5").unwrap().cents(), 120050);
    /// assert!(Money::parse("12.345").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, DecimalError> {
        let cleaned: String = text
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        parse_scaled(&cleaned, CURRENCY_PLACES).map(Money)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    ///
    /// ## Example
    /// ```rust
    /// use pizzatrack_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(12950).units(), 129);
    /// assert_eq!(Money::from_cents(-550).units(), -5);
    /// ```
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a line quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use pizzatrack_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(10000); // $100.00
    /// assert_eq!(unit_price.checked_times(2), Some(Money::from_cents(20000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_times(2), None);
    /// ```
    #[inline]
    pub const fn checked_times(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Exact decimal text without currency symbol (`"129.50"`).
    pub fn to_decimal_string(&self) -> String {
        format_scaled(self.0, CURRENCY_PLACES)
    }

    /// Lossy `f64` view used only when writing JSON numbers.
    pub fn to_f64(&self) -> f64 {
        scaled_to_f64(self.0, CURRENCY_PLACES)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$129.50`, the format the inventory listing returns.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a line quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Decimal JSON Representation
// =============================================================================

/// Serde adapter writing money as a JSON decimal number (`129.5`) and reading
/// it from a number or a string (`129.5`, `"129.50"`, `"$129.50"`).
///
/// ```rust
/// use pizzatrack_core::money::Money;
///
/// #[derive(serde::Deserialize)]
/// struct Item {
///     #[serde(with = "pizzatrack_core::money::decimal")]
///     price: Money,
/// }
///
/// let item: Item = serde_json::from_str(r#"{"price": 99.9}"#).unwrap();
/// assert_eq!(item.price.cents(), 9990);
/// ```
pub mod decimal {
    use super::Money;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let text = crate::decimal::deserialize_text(deserializer)?;
        Money::parse(&text).map_err(de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

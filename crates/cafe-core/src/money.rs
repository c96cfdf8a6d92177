//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    A latte at 3.50 is stored as 350. Eight of them are 2800.            │
//! │    Every cart line, sale total and report sum is exact.                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cafe_core::money::Money;
//!
//! let price = Money::from_cents(350);  // 3.50
//! let line = price * 4i64;             // 14.00 (saturating)
//! assert_eq!(line.to_string(), "14.00");
//!
//! // Loose text from imported rows
//! assert_eq!(Money::parse_lenient("S/ 21,00"), Some(Money::from_cents(2100)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► CartLine.unit_price ──► CartLine.subtotal
///                                                        │
///                               SaleBuilder.total() ◄────┘
///                                      │
///                                      ▼
///                              Sale.total_cents ──► Reports
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let price = Money::from_cents(350);
    /// assert_eq!(price.cents(), 350);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a floating major-unit amount (e.g. `21.5` from a JSON
    /// number) to cents, rounding half away from zero.
    ///
    /// Returns `None` for NaN, infinities and values outside the i64 range.
    pub fn from_major_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Parses a loosely formatted amount.
    ///
    /// ## Rules
    /// - Currency prefixes `S/` and `$` are stripped
    /// - All whitespace is removed
    /// - A decimal comma is read as a decimal point
    /// - More than two fractional digits round half away from zero
    /// - Anything else (empty, letters, two separators) is `None`
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// assert_eq!(Money::parse_lenient("21.00"), Some(Money::from_cents(2100)));
    /// assert_eq!(Money::parse_lenient("$ 3,5"), Some(Money::from_cents(350)));
    /// assert_eq!(Money::parse_lenient("-0.125"), Some(Money::from_cents(-13)));
    /// assert_eq!(Money::parse_lenient("bad"), None);
    /// assert_eq!(Money::parse_lenient("1,234.50"), None);
    /// ```
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let cleaned: String = input
            .replace("S/", "")
            .replace('$', "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '.' } else { c })
            .collect();

        let (negative, unsigned) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.strip_prefix('+').unwrap_or(cleaned.as_str())),
        };

        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let major: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };

        let digits: Vec<i64> = frac_part.bytes().map(|b| (b - b'0') as i64).collect();
        let mut minor = digits.first().copied().unwrap_or(0) * 10 + digits.get(1).copied().unwrap_or(0);
        if digits.get(2).copied().unwrap_or(0) >= 5 {
            minor += 1;
        }

        let cents = major.checked_mul(100)?.checked_add(minor)?;
        Some(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).major(), 10);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount in major units as a float.
    ///
    /// Only for output formats that need a number cell (spreadsheets,
    /// chart bars). Never feed the result back into arithmetic.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies money by a quantity, or `None` if the result does not
    /// fit in an i64 of cents.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(350);
    /// assert_eq!(unit_price.checked_mul_quantity(8), Some(Money::from_cents(2800)));
    /// assert_eq!(Money::from_cents(i64::MAX / 2).checked_mul_quantity(3), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Formats the amount with a currency symbol in front.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1234).with_symbol("S/"), "S/ 12.34");
    /// assert_eq!(Money::from_cents(-550).with_symbol("$"), "-$ 5.50");
    /// ```
    pub fn with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{} {}", sign, symbol, self.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal form, no currency symbol: `12.34`, `-5.50`.
///
/// This is the form written into CSV and PDF cells.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// The operators saturate at the i64 range. Report totals over imported
// rows can reach it; the cart uses the checked forms instead.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_with_symbol() {
        assert_eq!(Money::from_cents(2800).with_symbol("S/"), "S/ 28.00");
        assert_eq!(Money::zero().with_symbol("$"), "$ 0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3i64).cents(), 3000);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_cents(1400), Money::from_cents(350)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 1750);

        let empty: Vec<Money> = Vec::new();
        assert_eq!(empty.into_iter().sum::<Money>(), Money::zero());
    }

    #[test]
    fn test_arithmetic_near_limits() {
        let big = Money::from_cents(i64::MAX - 10);

        assert_eq!(big + Money::from_cents(100), Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MIN + 1) - big, Money::from_cents(i64::MIN));
        assert_eq!(big * 2i64, Money::from_cents(i64::MAX));

        let total: Money = vec![big, big, big].into_iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));

        assert_eq!(big.checked_add(Money::from_cents(100)), None);
        assert_eq!(big.checked_mul_quantity(2), None);
        assert_eq!(
            Money::from_cents(350).checked_mul_quantity(3),
            Some(Money::from_cents(1050))
        );

        let floor = Money::from_cents(i64::MIN);
        assert_eq!(floor.abs(), Money::from_cents(i64::MAX));
        assert_eq!(floor.with_symbol("S/"), "-S/ 92233720368547758.07");
    }

    #[test]
    fn test_parse_lenient_plain_and_prefixed() {
        assert_eq!(Money::parse_lenient("21.00"), Some(Money::from_cents(2100)));
        assert_eq!(Money::parse_lenient("21"), Some(Money::from_cents(2100)));
        assert_eq!(Money::parse_lenient("S/ 21.00"), Some(Money::from_cents(2100)));
        assert_eq!(Money::parse_lenient("S/21,5"), Some(Money::from_cents(2150)));
        assert_eq!(Money::parse_lenient("$ 0,99"), Some(Money::from_cents(99)));
        assert_eq!(Money::parse_lenient(".5"), Some(Money::from_cents(50)));
    }

    #[test]
    fn test_parse_lenient_rounding() {
        assert_eq!(Money::parse_lenient("1.005"), Some(Money::from_cents(101)));
        assert_eq!(Money::parse_lenient("1.004"), Some(Money::from_cents(100)));
        assert_eq!(Money::parse_lenient("-2.345"), Some(Money::from_cents(-235)));
    }

    #[test]
    fn test_parse_lenient_rejects_garbage() {
        assert_eq!(Money::parse_lenient(""), None);
        assert_eq!(Money::parse_lenient("   "), None);
        assert_eq!(Money::parse_lenient("bad"), None);
        assert_eq!(Money::parse_lenient("1.2.3"), None);
        assert_eq!(Money::parse_lenient("12abc"), None);
        assert_eq!(Money::parse_lenient("."), None);
    }

    #[test]
    fn test_from_major_f64() {
        assert_eq!(Money::from_major_f64(21.0), Some(Money::from_cents(2100)));
        assert_eq!(Money::from_major_f64(3.5), Some(Money::from_cents(350)));
        assert_eq!(Money::from_major_f64(0.1 + 0.2), Some(Money::from_cents(30)));
        assert_eq!(Money::from_major_f64(f64::NAN), None);
        assert_eq!(Money::from_major_f64(f64::INFINITY), None);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}

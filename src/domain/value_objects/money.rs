//! # Money Value Object
//!
//! Integer minor-currency-unit amounts with checked arithmetic.
//!
//! All stored and compared amounts in this crate are whole numbers of minor
//! currency units (pence). Major-unit strings ("£110.00") exist only for
//! user-facing messages, produced by [`Money::format_major`] / `Display`.
//!
//! # Examples
//!
//! ```
//! use boxoffice::domain::value_objects::money::Money;
//!
//! let face_value = Money::from_minor(10_000).unwrap();
//! let cap = face_value.percent_floor(110).unwrap();
//! assert_eq!(cap.minor_units(), 11_000);
//! assert_eq!(cap.to_string(), "£110.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned for invalid or overflowing money arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Amount was negative.
    #[error("money amount cannot be negative: {0}")]
    Negative(i64),

    /// Arithmetic overflowed the representable range.
    #[error("money arithmetic overflow")]
    Overflow,
}

/// A non-negative amount of minor currency units (pence).
///
/// # Invariants
///
/// - Amount is always >= 0
/// - Arithmetic is checked; operations that would overflow return an error
///
/// # Examples
///
/// ```
/// use boxoffice::domain::value_objects::money::Money;
///
/// let price = Money::from_minor(5_000).unwrap();
/// let fee = price.percent_round_half_up(8).unwrap();
/// let total = price.checked_add(fee).unwrap();
///
/// assert_eq!(fee.minor_units(), 400);
/// assert_eq!(total.minor_units(), 5_400);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    /// Zero amount constant.
    pub const ZERO: Self = Self(0);

    /// Largest representable amount.
    pub const MAX: Self = Self(i64::MAX);

    /// Creates an amount from minor currency units.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if the amount is below zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use boxoffice::domain::value_objects::money::Money;
    ///
    /// assert!(Money::from_minor(100).is_ok());
    /// assert!(Money::from_minor(-1).is_err());
    /// ```
    pub const fn from_minor(amount: i64) -> Result<Self, MoneyError> {
        if amount < 0 {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Returns the amount in minor currency units.
    #[inline]
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Adds two amounts with overflow checking.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] on overflow.
    pub const fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        match self.0.checked_add(other.0) {
            Some(sum) => Ok(Self(sum)),
            None => Err(MoneyError::Overflow),
        }
    }

    /// Computes `floor(self × percent / 100)`.
    ///
    /// Used for resale price ceilings, where the cap rounds down.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the result exceeds the
    /// representable range.
    pub fn percent_floor(self, percent: u32) -> Result<Self, MoneyError> {
        let scaled = i128::from(self.0) * i128::from(percent);
        i64::try_from(scaled / 100)
            .map(Self)
            .map_err(|_| MoneyError::Overflow)
    }

    /// Computes `round(self × percent / 100)`, rounding halves up.
    ///
    /// Used for platform fees. Amounts are non-negative, so adding half the
    /// divisor before truncating implements half-up rounding.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the result exceeds the
    /// representable range.
    pub fn percent_round_half_up(self, percent: u32) -> Result<Self, MoneyError> {
        let scaled = i128::from(self.0) * i128::from(percent);
        i64::try_from((scaled + 50) / 100)
            .map(Self)
            .map_err(|_| MoneyError::Overflow)
    }

    /// Formats the amount as a major-unit string, e.g. `£110.00`.
    ///
    /// For user-facing messages only; stored and compared values stay in
    /// minor units.
    #[must_use]
    pub fn format_major(&self) -> String {
        format!("£{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_major())
    }
}

impl TryFrom<i64> for Money {
    type Error = MoneyError;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        Self::from_minor(amount)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.minor_units()
    }
}

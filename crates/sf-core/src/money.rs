//! Monetary amounts with two-decimal precision
//!
//! Amounts are stored as whole minor units (cents), so ledger arithmetic
//! never drifts: 14.70 - 4.90 is exactly 9.80.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MoneyError, MoneyResult};

/// Non-negative amount in minor units (cents)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(0);

    /// Create from minor units
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create from whole units plus cents, e.g. `Money::new(30, 0)` = 30.00
    pub const fn new(units: u64, cents: u64) -> Self {
        Self(units * 100 + cents)
    }

    /// Create from a decimal value, rounding to two decimals
    pub fn from_decimal(value: f64) -> MoneyResult<Self> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(MoneyError::Negative(value));
        }
        let cents = (value * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(MoneyError::OutOfRange(value));
        }
        Ok(Self(cents as u64))
    }

    /// Minor units
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Decimal value (display / external APIs only)
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtract, returning `None` if the result would be negative
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Subtract, clamping at zero
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Accepts `14.70`, `14,70` and `14`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(',', ".");
        let value: f64 = normalized
            .parse()
            .map_err(|_| MoneyError::Parse(s.to_string()))?;
        Money::from_decimal(value)
    }
}

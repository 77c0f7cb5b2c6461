//! Fixed-point money amount.
//!
//! # Responsibility
//! - Represent currency values as integer minor units (hundredths).
//! - Parse user-entered decimal text and render it back with two decimals.
//!
//! # Invariants
//! - Arithmetic never goes through floating point.
//! - Parsed text is non-negative; negative values only arise from subtraction
//!   (for example a ledger balance).

use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

const MINOR_UNITS_PER_MAJOR: i64 = 100;
const MAX_FRACTION_DIGITS: usize = 2;

/// Money value stored as minor units (cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Builds an amount from minor units.
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Builds an amount from whole currency units.
    pub const fn from_major(major: i64) -> Self {
        Self(major * MINOR_UNITS_PER_MAJOR)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parses decimal text such as `120`, `12.5` or `1,200.50`.
    ///
    /// Thousands separators are accepted only between groups of three digits.
    /// At most two fractional digits are allowed; signs are rejected.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAmount(text.to_string());
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let (grouped, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };
        if grouped.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(invalid());
        }
        let whole = ungroup_digits(grouped).ok_or_else(invalid)?;
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(&whole) || !all_digits(fraction) {
            return Err(invalid());
        }

        let whole_value = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|_| invalid())?
        };
        let fraction_value = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid())?,
        };

        whole_value
            .checked_mul(MINOR_UNITS_PER_MAJOR)
            .and_then(|value| value.checked_add(fraction_value))
            .map(Self)
            .ok_or_else(invalid)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

/// Strips thousands separators from the integer part.
///
/// Returns `None` unless every comma sits between a leading group of one to
/// three characters and trailing groups of exactly three.
fn ungroup_digits(whole: &str) -> Option<String> {
    if !whole.contains(',') {
        return Some(whole.to_string());
    }
    let mut groups = whole.split(',');
    let leading = groups.next()?;
    if leading.is_empty() || leading.len() > 3 {
        return None;
    }
    let mut digits = leading.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_UNITS_PER_MAJOR as u64;
        write!(f, "{sign}{}.{:02}", abs / per_major, abs % per_major)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

//! Money value type with exact minor-unit storage.
//!
//! # Responsibility
//! - Represent an amount of one currency as an integer count of minor units.
//! - Convert human-readable major-unit decimals into minor units losslessly.
//!
//! # Invariants
//! - `amount_minor` is always expressed in the currency's smallest unit.
//! - A `Money` is never mutated; arithmetic returns a new value.
//! - Values of different currencies are never ordered or combined.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Currencies accepted by this system. Every entry uses two decimal places.
const SUPPORTED_CURRENCIES: &[CurrencyUnit] = &[
    CurrencyUnit::TWD,
    CurrencyUnit::USD,
    CurrencyUnit::EUR,
    CurrencyUnit::GBP,
    CurrencyUnit::CNY,
    CurrencyUnit::HKD,
];

/// Errors raised while building or combining money values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Currency code is not in the supported set.
    InvalidCurrency(String),
    /// Two values of different currencies were compared or combined.
    CurrencyMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Major amount carries more decimal places than the currency allows.
    FractionalMinorUnits {
        amount: Decimal,
        currency: &'static str,
    },
    /// Minor amount does not fit in `i64`.
    AmountOverflow { currency: &'static str },
}

impl Display for MoneyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCurrency(code) => write!(f, "unknown currency code `{code}`"),
            Self::CurrencyMismatch { expected, found } => {
                write!(f, "currency mismatch: expected {expected}, found {found}")
            }
            Self::FractionalMinorUnits { amount, currency } => write!(
                f,
                "amount {amount} has fractional minor units for currency {currency}"
            ),
            Self::AmountOverflow { currency } => {
                write!(f, "amount out of range for currency {currency}")
            }
        }
    }
}

impl Error for MoneyError {}

/// ISO-4217 currency with its minor-unit exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyUnit {
    code: &'static str,
    decimal_places: u32,
}

impl CurrencyUnit {
    pub const TWD: Self = Self::two_places("TWD");
    pub const USD: Self = Self::two_places("USD");
    pub const EUR: Self = Self::two_places("EUR");
    pub const GBP: Self = Self::two_places("GBP");
    pub const CNY: Self = Self::two_places("CNY");
    pub const HKD: Self = Self::two_places("HKD");

    const fn two_places(code: &'static str) -> Self {
        Self {
            code,
            decimal_places: 2,
        }
    }

    /// Resolves a 3-letter code against the supported set.
    ///
    /// Surrounding whitespace is ignored; matching is case-sensitive.
    pub fn of(code: &str) -> Result<Self, MoneyError> {
        let trimmed = code.trim();
        SUPPORTED_CURRENCIES
            .iter()
            .find(|unit| unit.code == trimmed)
            .copied()
            .ok_or_else(|| MoneyError::InvalidCurrency(trimmed.to_string()))
    }

    /// Returns every currency this system accepts.
    pub fn supported() -> &'static [CurrencyUnit] {
        SUPPORTED_CURRENCIES
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places)
    }
}

impl Display for CurrencyUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}

/// Immutable amount of a single currency, stored in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Money {
    currency: CurrencyUnit,
    amount_minor: i64,
}

impl Money {
    /// Builds money from a major-unit decimal such as `100.00`.
    ///
    /// # Errors
    /// - `InvalidCurrency` when `currency` is not supported.
    /// - `FractionalMinorUnits` when rounding would be required.
    /// - `AmountOverflow` when the minor amount exceeds `i64`.
    pub fn of(amount: Decimal, currency: &str) -> Result<Self, MoneyError> {
        Self::of_unit(amount, CurrencyUnit::of(currency)?)
    }

    /// Same as [`Money::of`] with an already resolved currency.
    pub fn of_unit(amount: Decimal, currency: CurrencyUnit) -> Result<Self, MoneyError> {
        let overflow = || MoneyError::AmountOverflow {
            currency: currency.code,
        };
        let scaled = amount
            .checked_mul(Decimal::from(currency.minor_per_major()))
            .ok_or_else(overflow)?;
        if !scaled.fract().is_zero() {
            return Err(MoneyError::FractionalMinorUnits {
                amount,
                currency: currency.code,
            });
        }
        let amount_minor = scaled.to_i64().ok_or_else(overflow)?;
        Ok(Self {
            currency,
            amount_minor,
        })
    }

    /// Builds money directly from minor units. Exact, no rounding.
    pub fn of_minor(amount_minor: i64, currency: &str) -> Result<Self, MoneyError> {
        Ok(Self::of_minor_unit(amount_minor, CurrencyUnit::of(currency)?))
    }

    /// Same as [`Money::of_minor`] with an already resolved currency.
    pub fn of_minor_unit(amount_minor: i64, currency: CurrencyUnit) -> Self {
        Self {
            currency,
            amount_minor,
        }
    }

    /// Canonical persisted form: the exact minor-unit count.
    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    /// Major-unit amount at the currency's scale, e.g. `175.00`.
    pub fn amount_major(&self) -> Decimal {
        Decimal::new(self.amount_minor, self.currency.decimal_places)
    }

    pub fn currency(&self) -> CurrencyUnit {
        self.currency
    }

    /// Orders two values of the same currency.
    ///
    /// # Errors
    /// - `CurrencyMismatch` when the currencies differ.
    pub fn compare(&self, other: &Self) -> Result<Ordering, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount_minor.cmp(&other.amount_minor))
    }

    pub fn is_greater_than(&self, other: &Self) -> Result<bool, MoneyError> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    pub fn is_less_than(&self, other: &Self) -> Result<bool, MoneyError> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    /// Returns `self + other` for values of one currency.
    pub fn plus(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount_minor = self
            .amount_minor
            .checked_add(other.amount_minor)
            .ok_or(MoneyError::AmountOverflow {
                currency: self.currency.code,
            })?;
        Ok(Self::of_minor_unit(amount_minor, self.currency))
    }

    /// Returns `self - other` for values of one currency.
    pub fn minus(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount_minor = self
            .amount_minor
            .checked_sub(other.amount_minor)
            .ok_or(MoneyError::AmountOverflow {
                currency: self.currency.code,
            })?;
        Ok(Self::of_minor_unit(amount_minor, self.currency))
    }

    fn ensure_same_currency(&self, other: &Self) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                expected: self.currency.code,
                found: other.currency.code,
            });
        }
        Ok(())
    }
}

impl PartialOrd for Money {
    /// `None` across currencies; there is no implicit conversion.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency.code, self.amount_major())
    }
}

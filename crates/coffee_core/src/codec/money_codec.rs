//! Money <-> stored value conversion.
//!
//! # Responsibility
//! - Write every price as a bare integer of minor units.
//! - Read both stored shapes: the legacy `{amount, currency}` record and the
//!   bare integer paired with a fixed currency.
//!
//! # Invariants
//! - Readers are tried in registration order; the first one that accepts the
//!   value's shape decides the result.
//! - A value no reader accepts is an error, never a default price.
//! - The integer reader drops currency information; it is only valid while the
//!   collection holds a single currency.

use crate::model::money::{CurrencyUnit, Money, MoneyError};
use rust_decimal::Decimal;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

const AMOUNT_KEY: &str = "amount";
const CURRENCY_KEY: &str = "currency";

/// Errors raised while decoding stored documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Stored price matches none of the registered shapes.
    MalformedMoneyField { shape: &'static str },
    /// Stored price had an accepted shape but an invalid money value.
    Money(MoneyError),
    /// Stored document is not a valid coffee document.
    MalformedDocument(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedMoneyField { shape } => {
                write!(f, "malformed money field: unsupported `{shape}` value")
            }
            Self::Money(err) => write!(f, "{err}"),
            Self::MalformedDocument(message) => write!(f, "malformed document: {message}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Money(err) => Some(err),
            Self::MalformedMoneyField { .. } | Self::MalformedDocument(_) => None,
        }
    }
}

impl From<MoneyError> for CodecError {
    fn from(value: MoneyError) -> Self {
        Self::Money(value)
    }
}

/// One stored shape the codec knows how to read.
pub trait MoneyReadConverter: Send + Sync {
    /// Short label used in logs and `Debug` output.
    fn name(&self) -> &'static str;

    /// Returns `None` when `value` is not this converter's shape.
    fn read(&self, value: &Value) -> Option<Result<Money, CodecError>>;
}

/// Reads `{ "amount": <major units>, "currency": "<code>" }` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredMoneyReader;

impl MoneyReadConverter for StructuredMoneyReader {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn read(&self, value: &Value) -> Option<Result<Money, CodecError>> {
        let Value::Object(fields) = value else {
            return None;
        };
        let (Some(amount), Some(currency)) = (fields.get(AMOUNT_KEY), fields.get(CURRENCY_KEY))
        else {
            return None;
        };
        Some(read_structured(amount, currency))
    }
}

fn read_structured(amount: &Value, currency: &Value) -> Result<Money, CodecError> {
    let Value::String(code) = currency else {
        return Err(CodecError::MalformedMoneyField {
            shape: value_shape(currency),
        });
    };
    let text = match amount {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => {
            return Err(CodecError::MalformedMoneyField {
                shape: value_shape(amount),
            })
        }
    };
    let currency = CurrencyUnit::of(code)?;
    let major = parse_major(&text, currency).ok_or(CodecError::MalformedMoneyField {
        shape: value_shape(amount),
    })??;
    Ok(Money::of_unit(major, currency)?)
}

/// `None` when `text` is not a number at all; `AmountOverflow` when it is a
/// number `Decimal` cannot hold.
fn parse_major(text: &str, currency: CurrencyUnit) -> Option<Result<Decimal, MoneyError>> {
    if let Ok(major) = Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)) {
        return Some(Ok(major));
    }
    let numeric = text.bytes().any(|byte| byte.is_ascii_digit()) && text.parse::<f64>().is_ok();
    numeric.then(|| {
        Err(MoneyError::AmountOverflow {
            currency: currency.code(),
        })
    })
}

/// Reads a bare integer as minor units of one fixed currency.
#[derive(Debug, Clone, Copy)]
pub struct MinorUnitsMoneyReader {
    currency: CurrencyUnit,
}

impl MinorUnitsMoneyReader {
    pub fn new(currency: CurrencyUnit) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> CurrencyUnit {
        self.currency
    }
}

impl MoneyReadConverter for MinorUnitsMoneyReader {
    fn name(&self) -> &'static str {
        "minor_units"
    }

    fn read(&self, value: &Value) -> Option<Result<Money, CodecError>> {
        value
            .as_i64()
            .map(|minor| Ok(Money::of_minor_unit(minor, self.currency)))
    }
}

/// Ordered registry of read converters plus the integer writer.
#[derive(Default)]
pub struct MoneyCodec {
    readers: Vec<Box<dyn MoneyReadConverter>>,
}

impl MoneyCodec {
    /// Creates a codec with no readers; every decode fails until one is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec for a single-currency collection: structured records first, then
    /// bare integers in `currency`.
    pub fn single_currency(currency: CurrencyUnit) -> Self {
        Self::new()
            .with_reader(StructuredMoneyReader)
            .with_reader(MinorUnitsMoneyReader::new(currency))
    }

    /// Appends a reader after the ones already registered.
    pub fn with_reader(mut self, reader: impl MoneyReadConverter + 'static) -> Self {
        self.readers.push(Box::new(reader));
        self
    }

    /// Registered reader names in try order.
    pub fn reader_names(&self) -> Vec<&'static str> {
        self.readers.iter().map(|reader| reader.name()).collect()
    }

    /// Always writes the integer minor-unit form.
    pub fn encode(&self, money: &Money) -> Value {
        Value::from(money.amount_minor())
    }

    /// Decodes a stored price by trying each reader in order.
    ///
    /// # Errors
    /// - `MalformedMoneyField` when no reader accepts the value's shape.
    /// - `Money` when the accepting reader finds an invalid amount or currency.
    pub fn decode(&self, value: &Value) -> Result<Money, CodecError> {
        self.readers
            .iter()
            .find_map(|reader| reader.read(value))
            .unwrap_or(Err(CodecError::MalformedMoneyField {
                shape: value_shape(value),
            }))
    }
}

impl Debug for MoneyCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoneyCodec")
            .field("readers", &self.reader_names())
            .finish()
    }
}

fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_i64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

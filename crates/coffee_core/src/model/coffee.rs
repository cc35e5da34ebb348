//! Coffee domain entity.
//!
//! # Responsibility
//! - Define the menu record persisted in the `coffee` collection.
//! - Own timestamp bookkeeping for price changes.
//!
//! # Invariants
//! - `id` is assigned by the store on first insert and never reused.
//! - `update_time >= create_time`; a re-price moves `update_time` strictly
//!   past its previous value.
//! - `name` is never blank.

use crate::model::money::Money;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Store-assigned identifier of a coffee document.
pub type CoffeeId = Uuid;

/// Validation failures for coffee records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoffeeValidationError {
    NilId,
    EmptyName,
    InvalidTimestamps { create_time: i64, update_time: i64 },
}

impl Display for CoffeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "coffee id must not be nil"),
            Self::EmptyName => write!(f, "coffee name must not be empty"),
            Self::InvalidTimestamps {
                create_time,
                update_time,
            } => write!(
                f,
                "updateTime ({update_time}) must be >= createTime ({create_time})"
            ),
        }
    }
}

impl Error for CoffeeValidationError {}

/// A menu item with its price and lifecycle timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coffee {
    /// `None` until the store assigns one.
    pub id: Option<CoffeeId>,
    pub name: String,
    pub price: Money,
    /// Unix epoch milliseconds.
    pub create_time: i64,
    /// Unix epoch milliseconds. Never earlier than `create_time`.
    pub update_time: i64,
}

impl Coffee {
    /// Creates an unsaved coffee with both timestamps set to now.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        let now = now_epoch_ms();
        Self {
            id: None,
            name: name.into(),
            price,
            create_time: now,
            update_time: now,
        }
    }

    /// Rebuilds a coffee from stored fields, validating invariants.
    pub fn restore(
        id: CoffeeId,
        name: impl Into<String>,
        price: Money,
        create_time: i64,
        update_time: i64,
    ) -> Result<Self, CoffeeValidationError> {
        let coffee = Self {
            id: Some(id),
            name: name.into(),
            price,
            create_time,
            update_time,
        };
        coffee.validate()?;
        Ok(coffee)
    }

    /// Replaces the price and advances `update_time`.
    pub fn reprice(&mut self, price: Money) {
        self.price = price;
        self.touch();
    }

    /// Moves `update_time` to now, or one millisecond past its previous value
    /// when the clock has not advanced.
    pub fn touch(&mut self) {
        let floor = self.update_time.max(self.create_time).saturating_add(1);
        self.update_time = now_epoch_ms().max(floor);
    }

    pub fn validate(&self) -> Result<(), CoffeeValidationError> {
        if self.id.is_some_and(|id| id.is_nil()) {
            return Err(CoffeeValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(CoffeeValidationError::EmptyName);
        }
        if self.update_time < self.create_time {
            return Err(CoffeeValidationError::InvalidTimestamps {
                create_time: self.create_time,
                update_time: self.update_time,
            });
        }
        Ok(())
    }
}

impl Display for Coffee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self
            .id
            .map_or_else(|| "unsaved".to_string(), |id| id.to_string());
        write!(
            f,
            "Coffee(id={id}, name={}, price={}, createTime={}, updateTime={})",
            self.name, self.price, self.create_time, self.update_time
        )
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

//! Scripted walkthrough of the coffee store.
//!
//! Inserts two drinks, lists them by name, re-prices one, looks it up by name
//! and clears the collection. Every observed record is logged and returned so
//! callers can print or assert on it.

use crate::model::coffee::Coffee;
use crate::model::money::{CurrencyUnit, Money, MoneyError};
use crate::repo::coffee_repo::{CoffeeRepository, RepoError};
use crate::service::coffee_service::CoffeeService;
use log::info;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ESPRESSO: &str = "espresso";
const LATTE: &str = "latte";

/// Failure while running the walkthrough.
#[derive(Debug)]
pub enum DemoError {
    Money(MoneyError),
    Repo(RepoError),
    /// A stage observed something other than what the previous stage wrote.
    Unexpected(String),
}

impl Display for DemoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Money(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Unexpected(message) => write!(f, "demo stage failed: {message}"),
        }
    }
}

impl Error for DemoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Money(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Unexpected(_) => None,
        }
    }
}

impl From<MoneyError> for DemoError {
    fn from(value: MoneyError) -> Self {
        Self::Money(value)
    }
}

impl From<RepoError> for DemoError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// What each stage of the walkthrough observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    /// Records as returned by the insert, with ids assigned.
    pub inserted: Vec<Coffee>,
    /// Full collection sorted by name after the insert.
    pub sorted: Vec<Coffee>,
    /// The latte after its price change was saved.
    pub repriced: Coffee,
    /// Result of the by-name query for the latte.
    pub found: Vec<Coffee>,
    /// Records left after the final delete.
    pub remaining: usize,
}

/// Runs insert -> sorted list -> re-price -> by-name query -> delete all.
pub fn run_demo<R: CoffeeRepository>(
    service: &CoffeeService<R>,
    currency: CurrencyUnit,
) -> Result<DemoReport, DemoError> {
    let espresso = Coffee::new(ESPRESSO, major(10_000, currency)?);
    let latte = Coffee::new(LATTE, major(15_000, currency)?);

    let inserted = service.create_menu(vec![espresso, latte])?;
    info!(
        "event=demo_insert module=demo status=ok count={}",
        inserted.len()
    );

    let sorted = service.menu_sorted_by_name()?;
    for coffee in &sorted {
        info!("event=demo_saved module=demo status=ok coffee={coffee}");
    }

    let mut latte = inserted
        .iter()
        .find(|coffee| coffee.name == LATTE)
        .cloned()
        .ok_or_else(|| DemoError::Unexpected("inserted latte is missing".to_string()))?;
    let repriced = service.reprice(&mut latte, major(17_500, currency)?)?;

    let found = service.find_by_name(LATTE)?;
    for coffee in &found {
        info!("event=demo_found module=demo status=ok coffee={coffee}");
    }

    service.clear()?;
    let remaining = service.count()?;
    info!("event=demo_clear module=demo status=ok remaining={remaining}");

    Ok(DemoReport {
        inserted,
        sorted,
        repriced,
        found,
        remaining,
    })
}

/// Builds a price from a major amount given in hundredths, e.g. `17_500`
/// for `175.00`.
fn major(hundredths: i64, currency: CurrencyUnit) -> Result<Money, MoneyError> {
    Money::of_unit(Decimal::new(hundredths, 2), currency)
}

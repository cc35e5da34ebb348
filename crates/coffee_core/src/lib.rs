//! Core domain logic for the coffee menu store.
//! Money values, their persisted encoding, and the coffee document collection.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::money_codec::{
    CodecError, MinorUnitsMoneyReader, MoneyCodec, MoneyReadConverter, StructuredMoneyReader,
};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::coffee::{Coffee, CoffeeId, CoffeeValidationError};
pub use model::money::{CurrencyUnit, Money, MoneyError};
pub use repo::coffee_repo::{
    CoffeeRepository, RepoError, RepoResult, Sort, SortDirection, SqliteCoffeeRepository,
};
pub use service::coffee_service::CoffeeService;
pub use service::demo::{run_demo, DemoError, DemoReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

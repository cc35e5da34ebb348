//! Runtime configuration from environment variables.
//!
//! # Responsibility
//! - Resolve database location, log settings and the fixed read currency.
//! - Reject invalid values up front instead of at first use.
//!
//! Variables:
//! - `COFFEE_DB_PATH`: SQLite file; unset or blank means in-memory.
//! - `COFFEE_LOG_LEVEL`: `trace|debug|info|warn|error`; build-mode default.
//! - `COFFEE_LOG_DIR`: absolute directory for rolling logs; unset disables.
//! - `COFFEE_CURRENCY`: currency for integer-encoded prices; default `TWD`.

use crate::codec::money_codec::MoneyCodec;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, normalize_level};
use crate::model::money::{CurrencyUnit, MoneyError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "COFFEE_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "COFFEE_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "COFFEE_LOG_DIR";
pub const CURRENCY_VAR: &str = "COFFEE_CURRENCY";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidCurrency(MoneyError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_VAR}: {message}"),
            Self::InvalidCurrency(err) => write!(f, "{CURRENCY_VAR}: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel(_) => None,
            Self::InvalidCurrency(err) => Some(err),
        }
    }
}

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
    /// Currency paired with bare integer prices on read.
    pub currency: CurrencyUnit,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
            currency: CurrencyUnit::TWD,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => defaults.log_level,
        };
        let currency = match read(CURRENCY_VAR) {
            Some(raw) => CurrencyUnit::of(&raw).map_err(ConfigError::InvalidCurrency)?,
            None => defaults.currency,
        };

        Ok(Self {
            db_path: read(DB_PATH_VAR).map(PathBuf::from),
            log_level,
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
            currency,
        })
    }

    /// Opens the configured database with migrations applied.
    pub fn open_db(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }

    /// Codec reading legacy records and integers in the configured currency.
    pub fn money_codec(&self) -> MoneyCodec {
        MoneyCodec::single_currency(self.currency)
    }
}

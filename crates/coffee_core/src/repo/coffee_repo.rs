//! Coffee repository contract and SQLite document implementation.
//!
//! # Responsibility
//! - Provide insert/find/sort/save/delete over the `coffee` collection.
//! - Keep SQL and JSON document details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Coffee::validate()` before any SQL mutation.
//! - Every price is written through `MoneyCodec::encode` and read through
//!   `MoneyCodec::decode`; an undecodable document fails the whole read.
//! - `seq` records insertion order and breaks sort ties.
//! - Sorting runs on decoded records, so legacy and integer prices order by
//!   their minor-unit value.

use crate::codec::document::{decode_document, encode_document, field_path};
use crate::codec::money_codec::{CodecError, MoneyCodec};
use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::coffee::{Coffee, CoffeeId, CoffeeValidationError};
use log::{debug, info};
use rusqlite::{params, Connection, ErrorCode, Row, ToSql};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const COFFEE_TABLE: &str = "coffee";
const REQUIRED_COLUMNS: &[&str] = &["seq", "id", "document"];
const TEXT_FIELDS: &[&str] = &["id", "name"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for coffee persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CoffeeValidationError),
    Codec(CodecError),
    Db(DbError),
    NotFound(CoffeeId),
    DuplicateKey(CoffeeId),
    /// Sort or filter named a field the document does not have.
    UnknownField(String),
    /// Filter named a known field that is not string-valued.
    NonTextField(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "coffee not found: {id}"),
            Self::DuplicateKey(id) => write!(f, "duplicate coffee id: {id}"),
            Self::UnknownField(field) => write!(f, "unknown coffee field `{field}`"),
            Self::NonTextField(field) => {
                write!(f, "coffee field `{field}` is not a text field")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted coffee data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoffeeValidationError> for RepoError {
    fn from(value: CoffeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CodecError> for RepoError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sort direction for [`Sort`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SortKey {
    Id,
    Name,
    Price,
    CreateTime,
    UpdateTime,
}

impl SortKey {
    fn resolve(field: &str) -> RepoResult<Self> {
        match field {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "createTime" => Ok(Self::CreateTime),
            "updateTime" => Ok(Self::UpdateTime),
            _ => Err(RepoError::UnknownField(field.to_string())),
        }
    }

    fn compare(self, left: &Coffee, right: &Coffee) -> Ordering {
        match self {
            Self::Id => left.id.cmp(&right.id),
            Self::Name => left.name.cmp(&right.name),
            Self::Price => left
                .price
                .amount_minor()
                .cmp(&right.price.amount_minor())
                .then_with(|| left.price.currency().code().cmp(right.price.currency().code())),
            Self::CreateTime => left.create_time.cmp(&right.create_time),
            Self::UpdateTime => left.update_time.cmp(&right.update_time),
        }
    }
}

/// Ordering applied by [`CoffeeRepository::find_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    field: String,
    direction: SortDirection,
}

impl Sort {
    /// Ascending sort on a document field, e.g. `Sort::by("name")`.
    pub fn by(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn ascending(mut self) -> Self {
        self.direction = SortDirection::Ascending;
        self
    }

    pub fn descending(mut self) -> Self {
        self.direction = SortDirection::Descending;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Repository interface for the coffee collection.
pub trait CoffeeRepository {
    /// Inserts all records atomically, assigning ids to those without one.
    fn insert_all(&self, records: Vec<Coffee>) -> RepoResult<Vec<Coffee>>;
    /// Lists every record ordered by `sort`, ties in insertion order.
    fn find_all(&self, sort: &Sort) -> RepoResult<Vec<Coffee>>;
    /// Lists records whose string field `field` equals `value` exactly.
    /// Numeric fields fail with `NonTextField`.
    fn find_by_field(&self, field: &str, value: &str) -> RepoResult<Vec<Coffee>>;
    fn find_by_id(&self, id: CoffeeId) -> RepoResult<Option<Coffee>>;
    /// Upserts by id; a record without id is inserted with a new one.
    fn save(&self, record: &Coffee) -> RepoResult<Coffee>;
    fn delete_by_id(&self, id: CoffeeId) -> RepoResult<()>;
    fn delete_all(&self) -> RepoResult<()>;
    fn count(&self) -> RepoResult<usize>;
}

/// SQLite-backed coffee collection storing one JSON document per row.
#[derive(Debug)]
pub struct SqliteCoffeeRepository<'conn> {
    conn: &'conn Connection,
    codec: MoneyCodec,
}

impl<'conn> SqliteCoffeeRepository<'conn> {
    /// Wraps a migrated connection with the given money codec.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the one this repository writes.
    pub fn try_new(conn: &'conn Connection, codec: MoneyCodec) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn, codec })
    }

    pub fn codec(&self) -> &MoneyCodec {
        &self.codec
    }

    fn insert_one(&self, record: &Coffee) -> RepoResult<Coffee> {
        let id = record.id.unwrap_or_else(Uuid::new_v4);
        let document = encode_document(record, id, &self.codec)?;
        self.conn
            .execute(
                "INSERT INTO coffee (id, document) VALUES (?1, ?2);",
                params![id.to_string(), document],
            )
            .map_err(|err| map_constraint_error(err, id))?;

        let mut saved = record.clone();
        saved.id = Some(id);
        Ok(saved)
    }

    fn query_documents(&self, sql: &str, bind: &[&dyn ToSql]) -> RepoResult<Vec<Coffee>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(self.parse_row(row)?);
        }

        Ok(records)
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<Coffee> {
        let id_text: String = row.get("id")?;
        let document: String = row.get("document")?;
        let coffee = decode_document(&document, &self.codec)?;

        if coffee.id.map(|id| id.to_string()).as_deref() != Some(id_text.as_str()) {
            return Err(RepoError::InvalidData(format!(
                "document id does not match row id `{id_text}`"
            )));
        }
        Ok(coffee)
    }
}

impl CoffeeRepository for SqliteCoffeeRepository<'_> {
    fn insert_all(&self, records: Vec<Coffee>) -> RepoResult<Vec<Coffee>> {
        for record in &records {
            record.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let saved = records
            .iter()
            .map(|record| self.insert_one(record))
            .collect::<RepoResult<Vec<_>>>()?;
        tx.commit()?;

        info!(
            "event=coffee_insert module=repo status=ok count={}",
            saved.len()
        );
        Ok(saved)
    }

    fn find_all(&self, sort: &Sort) -> RepoResult<Vec<Coffee>> {
        let key = SortKey::resolve(sort.field())?;
        let mut records =
            self.query_documents("SELECT id, document FROM coffee ORDER BY seq ASC;", &[])?;
        // Stable: equal keys stay in `seq` order in both directions.
        records.sort_by(|left, right| sort.direction().apply(key.compare(left, right)));
        debug!(
            "event=coffee_find_all module=repo status=ok field={} count={}",
            sort.field(),
            records.len()
        );
        Ok(records)
    }

    fn find_by_field(&self, field: &str, value: &str) -> RepoResult<Vec<Coffee>> {
        let path = resolve_field(field)?;
        if !TEXT_FIELDS.contains(&field) {
            return Err(RepoError::NonTextField(field.to_string()));
        }
        self.query_documents(
            "SELECT id, document FROM coffee
             WHERE json_extract(document, ?1) = ?2
             ORDER BY seq ASC;",
            &[&path, &value],
        )
    }

    fn find_by_id(&self, id: CoffeeId) -> RepoResult<Option<Coffee>> {
        let id_text = id.to_string();
        let mut records = self.query_documents(
            "SELECT id, document FROM coffee WHERE id = ?1;",
            &[&id_text],
        )?;
        Ok(records.pop())
    }

    fn save(&self, record: &Coffee) -> RepoResult<Coffee> {
        record.validate()?;

        let Some(id) = record.id else {
            let saved = self.insert_one(record)?;
            info!("event=coffee_save module=repo status=ok mode=insert");
            return Ok(saved);
        };

        let document = encode_document(record, id, &self.codec)?;
        self.conn.execute(
            "INSERT INTO coffee (id, document) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET document = excluded.document;",
            params![id.to_string(), document],
        )?;
        info!("event=coffee_save module=repo status=ok mode=upsert");
        Ok(record.clone())
    }

    fn delete_by_id(&self, id: CoffeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM coffee WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<()> {
        let removed = self.conn.execute("DELETE FROM coffee;", [])?;
        info!("event=coffee_delete_all module=repo status=ok count={removed}");
        Ok(())
    }

    fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM coffee;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }
}

fn resolve_field(field: &str) -> RepoResult<&'static str> {
    field_path(field).ok_or_else(|| RepoError::UnknownField(field.to_string()))
}

fn map_constraint_error(err: rusqlite::Error, id: CoffeeId) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            return RepoError::DuplicateKey(id);
        }
    }
    err.into()
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_version(conn)?;
    let expected_version = latest_version();
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [COFFEE_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(COFFEE_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([COFFEE_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: COFFEE_TABLE,
                column: *column,
            });
        }
    }

    Ok(())
}

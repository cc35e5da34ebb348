//! Coffee <-> JSON document mapping.
//!
//! # Responsibility
//! - Define the persisted document shape of the `coffee` collection.
//! - Route the `price` field through [`MoneyCodec`].
//!
//! # Invariants
//! - Written documents always carry an `id` and an integer `price`.
//! - Decoded documents pass `Coffee::validate()` before they are returned.

use crate::codec::money_codec::{CodecError, MoneyCodec};
use crate::model::coffee::{Coffee, CoffeeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document fields that may be used for sorting and filtering, with their
/// JSON paths.
const FIELD_PATHS: &[(&str, &str)] = &[
    ("id", "$.id"),
    ("name", "$.name"),
    ("price", "$.price"),
    ("createTime", "$.createTime"),
    ("updateTime", "$.updateTime"),
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoffeeDocument {
    id: CoffeeId,
    name: String,
    price: Value,
    create_time: i64,
    update_time: i64,
}

/// Returns the JSON path for a known document field name.
pub fn field_path(field: &str) -> Option<&'static str> {
    FIELD_PATHS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, path)| *path)
}

/// Serializes `coffee` under `id` into document text.
pub fn encode_document(
    coffee: &Coffee,
    id: CoffeeId,
    codec: &MoneyCodec,
) -> Result<String, CodecError> {
    let document = CoffeeDocument {
        id,
        name: coffee.name.clone(),
        price: codec.encode(&coffee.price),
        create_time: coffee.create_time,
        update_time: coffee.update_time,
    };
    serde_json::to_string(&document).map_err(|err| CodecError::MalformedDocument(err.to_string()))
}

/// Parses document text back into a validated coffee.
pub fn decode_document(text: &str, codec: &MoneyCodec) -> Result<Coffee, CodecError> {
    let document: CoffeeDocument =
        serde_json::from_str(text).map_err(|err| CodecError::MalformedDocument(err.to_string()))?;
    let price = codec.decode(&document.price)?;
    Coffee::restore(
        document.id,
        document.name,
        price,
        document.create_time,
        document.update_time,
    )
    .map_err(|err| CodecError::MalformedDocument(err.to_string()))
}

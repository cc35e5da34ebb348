//! Persisted value conversion for the coffee collection.
//!
//! # Responsibility
//! - Map `Money` to and from stored JSON values.
//! - Map `Coffee` to and from stored JSON documents.
//!
//! # Invariants
//! - The write path emits exactly one shape; the read path accepts every
//!   shape that was ever written.

pub mod document;
pub mod money_codec;

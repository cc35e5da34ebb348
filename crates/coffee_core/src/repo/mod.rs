//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document-collection contract used by services.
//! - Isolate SQLite and JSON details from use-case orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateKey`,
//!   `Codec`) in addition to DB transport errors.

pub mod coffee_repo;

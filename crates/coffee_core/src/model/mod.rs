//! Domain model for the coffee menu.
//!
//! # Responsibility
//! - Define the money value type and the coffee entity.
//! - Keep persistence shapes out of the domain types.
//!
//! # Invariants
//! - Money is stored in integer minor units only.
//! - Every coffee embeds exactly one `Money` price.

pub mod coffee;
pub mod money;

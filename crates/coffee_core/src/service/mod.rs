//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into menu-level APIs.
//! - Keep CLI callers decoupled from storage details.

pub mod coffee_service;
pub mod demo;

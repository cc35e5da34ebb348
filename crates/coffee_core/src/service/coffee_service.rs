//! Coffee use-case service.
//!
//! # Responsibility
//! - Provide menu-level entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - A re-price always advances `update_time` before the record is saved.

use crate::model::coffee::Coffee;
use crate::model::money::Money;
use crate::repo::coffee_repo::{CoffeeRepository, RepoResult, Sort};

const NAME_FIELD: &str = "name";

/// Use-case service wrapper for coffee menu operations.
pub struct CoffeeService<R: CoffeeRepository> {
    repo: R,
}

impl<R: CoffeeRepository> CoffeeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Inserts a batch of new menu items and returns them with ids.
    pub fn create_menu(&self, items: Vec<Coffee>) -> RepoResult<Vec<Coffee>> {
        self.repo.insert_all(items)
    }

    /// Lists the menu ordered by name ascending.
    pub fn menu_sorted_by_name(&self) -> RepoResult<Vec<Coffee>> {
        self.repo.find_all(&Sort::by(NAME_FIELD))
    }

    /// Applies a new price to `coffee` in place and persists it.
    ///
    /// The caller's copy keeps the advanced `update_time`, so it stays in
    /// step with the stored document.
    pub fn reprice(&self, coffee: &mut Coffee, price: Money) -> RepoResult<Coffee> {
        coffee.reprice(price);
        self.repo.save(coffee)
    }

    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<Coffee>> {
        self.repo.find_by_field(NAME_FIELD, name)
    }

    pub fn count(&self) -> RepoResult<usize> {
        self.repo.count()
    }

    /// Removes every menu item.
    pub fn clear(&self) -> RepoResult<()> {
        self.repo.delete_all()
    }
}

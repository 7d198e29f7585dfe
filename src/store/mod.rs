//! Keyed store adapter: the minimal persistence contract.
//!
//! The repository layer depends only on [`KeyValueStore`]: `get`, `set`
//! (full overwrite), `delete`, and `get_by_prefix`. The store guarantees
//! per-key atomicity and nothing more — no multi-key transactions, no
//! compare-and-swap — and returns prefix-scan results in unspecified
//! order; callers re-sort. The adapter carries no domain semantics.
//!
//! Two backends ship: [`MemoryStore`] for tests and single-node
//! development, [`PostgresStore`] for durable deployments.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::error::LedgerError;

/// Prefix-scannable key/value store with per-key atomicity.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] on backend failure.
    async fn get(&self, key: &str) -> Result<Option<Value>, LedgerError>;

    /// Stores `value` under `key`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] on backend failure.
    async fn set(&self, key: &str, value: Value) -> Result<(), LedgerError>;

    /// Removes the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] on backend failure.
    async fn delete(&self, key: &str) -> Result<(), LedgerError>;

    /// Returns all current values whose key starts with `prefix`, in
    /// unspecified order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] on backend failure.
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, LedgerError>;
}

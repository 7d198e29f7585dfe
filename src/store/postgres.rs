//! PostgreSQL key/value backend.
//!
//! One `kv_entries` table maps keys to JSONB values. Writes are single-row
//! upserts, which is exactly the per-key atomicity the store contract
//! promises; prefix scans compile to an escaped `LIKE` over the primary
//! key index.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::KeyValueStore;
use crate::config::ServiceConfig;
use crate::error::LedgerError;

/// Durable store backed by `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps an existing connection pool. The `kv_entries` table must
    /// already exist.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the pool settings in `config` and ensures the
    /// `kv_entries` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the pool cannot be built or the
    /// schema statement fails.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, LedgerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| LedgerError::Store(e.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), LedgerError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_entries (key TEXT PRIMARY KEY, value JSONB NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Store(e.to_string()))?;
        Ok(())
    }
}

/// Escapes `LIKE` wildcards so a key prefix matches literally.
fn like_prefix_pattern(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}%")
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, LedgerError> {
        sqlx::query_scalar::<_, Value>("SELECT value FROM kv_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LedgerError::Store(e.to_string()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), LedgerError> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Store(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), LedgerError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| LedgerError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, LedgerError> {
        sqlx::query_scalar::<_, Value>("SELECT value FROM kv_entries WHERE key LIKE $1")
            .bind(like_prefix_pattern(prefix))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| LedgerError::Store(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_prefix_pattern("ride:"), "ride:%");
        assert_eq!(like_prefix_pattern("ride_x"), "ride\\_x%");
        assert_eq!(like_prefix_pattern("100%"), "100\\%%");
    }
}

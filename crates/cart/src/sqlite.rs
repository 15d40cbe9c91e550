//! SQLite-backed key-value storage for the device.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use crate::storage::{KeyValueStorage, StorageError};

/// Durable key-value slot in a local SQLite file.
///
/// The pool is opened lazily on first use, so constructing the storage never
/// touches the filesystem. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    path: Option<PathBuf>,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteStorage {
    /// Storage at the default location: `{app_data_dir}/storefront/storage.db`.
    pub fn new() -> Self {
        Self {
            path: None,
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Storage at an explicit database file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Initialize the database connection (called lazily on first use).
    async fn ensure_initialized(&self) -> anyhow::Result<SqlitePool> {
        let mut pool_guard = self.pool.lock().await;
        if let Some(pool) = pool_guard.as_ref() {
            return Ok(pool.clone());
        }

        let db_path = match &self.path {
            Some(path) => path.clone(),
            None => default_db_path().context(
                "failed to determine storage DB path - ensure app data directory is accessible",
            )?,
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create storage directory at {:?}", parent))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        // One connection keeps writes strictly ordered.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open SQLite storage at {:?}", db_path))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create kv_store table")?;

        tracing::debug!(path = ?db_path, "opened SQLite storage");
        *pool_guard = Some(pool.clone());
        Ok(pool)
    }

    async fn pool(&self) -> Result<SqlitePool, StorageError> {
        self.ensure_initialized()
            .await
            .map_err(|err| StorageError::Unavailable(format!("{err:#}")))
    }

    async fn get_inner(&self, pool: &SqlitePool, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM kv_store
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("failed to fetch value from kv_store")?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set_inner(&self, pool: &SqlitePool, key: &str, value: &str) -> anyhow::Result<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(pool)
        .await
        .context("failed to upsert value in kv_store")?;

        Ok(())
    }

    async fn remove_inner(&self, pool: &SqlitePool, key: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM kv_store
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .execute(pool)
        .await
        .context("failed to delete value from kv_store")?;

        Ok(())
    }
}

impl Default for SqliteStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStorage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let pool = self.pool().await?;
        self.get_inner(&pool, key)
            .await
            .map_err(|err| StorageError::Backend(format!("{err:#}")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let pool = self.pool().await?;
        self.set_inner(&pool, key, value)
            .await
            .map_err(|err| StorageError::Backend(format!("{err:#}")))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let pool = self.pool().await?;
        self.remove_inner(&pool, key)
            .await
            .map_err(|err| StorageError::Backend(format!("{err:#}")))
    }
}

/// Resolve the default database path: `{app_data_dir}/storefront/storage.db`.
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|mut h| {
            h.push(".local");
            h.push("share");
            h
        }))
        .context("failed to resolve OS app data directory (data_dir or ~/.local/share)")?;

    let mut path = base;
    path.push("storefront");
    path.push("storage.db");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.db");

        let first = SqliteStorage::with_path(&path);
        assert_eq!(first.get("user_cart").await.unwrap(), None);
        first.set("user_cart", "[]").await.unwrap();
        first.set("user_cart", r#"[{"id":1}]"#).await.unwrap();

        let second = SqliteStorage::with_path(&path);
        assert_eq!(
            second.get("user_cart").await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
    }

    #[tokio::test]
    async fn remove_deletes_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::with_path(dir.path().join("nested").join("storage.db"));

        storage.set("k", "v").await.unwrap();
        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
        storage.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn unopenable_path_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let storage = SqliteStorage::with_path(dir.path());

        let err = storage.get("k").await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}

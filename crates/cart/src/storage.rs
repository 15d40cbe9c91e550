//! Durable key-value slot abstraction.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation error.
///
/// The cart never surfaces these to its callers; they end up in logs.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or opened.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend was reachable but the operation failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Asynchronous text key-value storage.
///
/// At-least-once semantics are enough: the cart tolerates a dropped write.
/// Timeouts are the implementation's business.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value under `key`; `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<S> KeyValueStorage for Arc<S>
where
    S: KeyValueStorage + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }
}

/// In-memory storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value synchronously (test setup).
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let storage = InMemoryStorage::new();

        assert_eq!(storage.get("k").await.unwrap(), None);
        storage.set("k", "v1").await.unwrap();
        storage.set("k", "v2").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v2"));

        storage.remove("k").await.unwrap();
        assert!(!storage.contains_key("k"));
        // Removing again is fine.
        storage.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn arc_and_trait_objects_delegate() {
        let storage: Arc<dyn KeyValueStorage> =
            Arc::new(InMemoryStorage::new().with_entry("a", "1"));
        let shared = Arc::new(storage);

        assert_eq!(shared.get("a").await.unwrap().as_deref(), Some("1"));
    }
}

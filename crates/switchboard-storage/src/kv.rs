//! Raw key-value storage.
//!
//! All operations are scoped to a namespace; the composite key on disk is
//! `"{namespace}\0{key}"`. The null separator makes the namespace range
//! `["{ns}\0", "{ns}\x01")` capture exactly the namespace's keys.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

fn validate_part(part: &str, what: &str) -> StorageResult<()> {
    if part.is_empty() {
        return Err(StorageError::InvalidKey(format!("{what} must not be empty")));
    }
    if part.contains('\0') {
        return Err(StorageError::InvalidKey(format!(
            "{what} must not contain null bytes"
        )));
    }
    Ok(())
}

fn composite_key(namespace: &str, key: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(namespace.len() + 1 + key.len());
    buf.extend_from_slice(namespace.as_bytes());
    buf.push(0);
    buf.extend_from_slice(key.as_bytes());
    buf
}

fn namespace_range(namespace: &str) -> (Vec<u8>, Vec<u8>) {
    let mut start = Vec::with_capacity(namespace.len() + 1);
    start.extend_from_slice(namespace.as_bytes());
    start.push(0);
    let mut end = Vec::with_capacity(namespace.len() + 1);
    end.extend_from_slice(namespace.as_bytes());
    end.push(1);
    (start, end)
}

/// Namespaced byte-level storage.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get a value; `None` if the key does not exist.
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Set a value, overwriting any existing one.
    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Delete a key; `true` if it existed.
    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool>;

    /// List all keys in a namespace (no ordering guarantee).
    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: std::sync::RwLock<std::collections::HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{namespace}\0{key}")
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_part(namespace, "namespace")?;
        validate_part(key, "key")?;
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.get(&Self::full_key(namespace, key)).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_part(namespace, "namespace")?;
        validate_part(key, "key")?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        data.insert(Self::full_key(namespace, key), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        validate_part(namespace, "namespace")?;
        validate_part(key, "key")?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.remove(&Self::full_key(namespace, key)).is_some())
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        validate_part(namespace, "namespace")?;
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let prefix = format!("{namespace}\0");
        Ok(data
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix).map(String::from))
            .collect())
    }
}

/// Persistent store backed by embedded `SurrealKV`.
pub struct SurrealKvStore {
    tree: surrealkv::Tree,
}

impl std::fmt::Debug for SurrealKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealKvStore").finish_non_exhaustive()
    }
}

fn map_kv_err(e: &surrealkv::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

impl SurrealKvStore {
    /// Open (creating if needed) a store at the given directory path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the store cannot be opened.
    pub fn open(path: impl AsRef<std::path::Path>) -> StorageResult<Self> {
        let tree = surrealkv::TreeBuilder::new()
            .with_path(path.as_ref().to_path_buf())
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { tree })
    }

    /// Flush and close the store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the flush fails.
    pub async fn close(&self) -> StorageResult<()> {
        self.tree
            .close()
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }
}

#[async_trait]
impl KvStore for SurrealKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_part(namespace, "namespace")?;
        validate_part(key, "key")?;
        let ck = composite_key(namespace, key);
        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;
        tx.get(&ck).map_err(|ref e| map_kv_err(e))
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_part(namespace, "namespace")?;
        validate_part(key, "key")?;
        let ck = composite_key(namespace, key);
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        tx.set(&ck, &value).map_err(|ref e| map_kv_err(e))?;
        tx.commit().await.map_err(|ref e| map_kv_err(e))
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        validate_part(namespace, "namespace")?;
        validate_part(key, "key")?;
        let ck = composite_key(namespace, key);
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        let existed = tx.get(&ck).map_err(|ref e| map_kv_err(e))?.is_some();
        if existed {
            tx.delete(&ck).map_err(|ref e| map_kv_err(e))?;
            tx.commit().await.map_err(|ref e| map_kv_err(e))?;
        }
        Ok(existed)
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        validate_part(namespace, "namespace")?;
        let (start, end) = namespace_range(namespace);
        let prefix_len = namespace.len() + 1;

        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;
        let mut iter = tx.range(&start, &end).map_err(|ref e| map_kv_err(e))?;
        iter.seek_first().map_err(|ref e| map_kv_err(e))?;

        let mut keys = Vec::new();
        while iter.valid() {
            let raw_key = iter.key();
            if raw_key.len() > prefix_len {
                if let Ok(key_str) = std::str::from_utf8(&raw_key[prefix_len..]) {
                    keys.push(key_str.to_string());
                }
            }
            iter.next().map_err(|ref e| map_kv_err(e))?;
        }
        Ok(keys)
    }
}

/// Shared handle type used by the typed store.
pub type SharedKv = Arc<dyn KvStore>;

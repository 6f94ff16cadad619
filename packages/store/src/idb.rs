//! # IndexedDB key-value store: browser-side persistence
//!
//! [`IdbStore`] is the [`KeyValueStore`] implementation used on the **web
//! platform**. It keeps entries in the browser's IndexedDB via the [`rexie`]
//! crate, so a signed-in session survives page reloads.
//!
//! ## Database schema
//!
//! A single IndexedDB database named `"nutritrack"` (version 1) with one
//! object store:
//!
//! | IndexedDB store | Key | Value |
//! |-----------------|-----|-------|
//! | `"kv"` | entry key (e.g. `"@nutritrack_user"`) | string (serialised via `serde_wasm_bindgen`) |
//!
//! ## Connection management
//!
//! `IdbStore` is a small `Clone` struct that opens a fresh [`Rexie`]
//! connection on every operation. `Rexie` does not implement `Clone`, and the
//! browser caches IndexedDB connections internally.
//!
//! ## Error handling
//!
//! Every rexie or conversion failure is mapped to [`StorageError::Backend`]
//! and returned; nothing is swallowed.

use crate::error::StorageError;
use crate::kv::{check_key, KeyValueStore};
use rexie::{ObjectStore as RexieObjectStore, Rexie, TransactionMode};
use wasm_bindgen::JsValue;

const DEFAULT_DB_NAME: &str = "nutritrack";
const DB_VERSION: u32 = 1;
const KV_STORE: &str = "kv";

fn backend(e: impl std::fmt::Display) -> StorageError {
    StorageError::Backend(e.to_string())
}

/// IndexedDB-backed KeyValueStore for the web platform.
#[derive(Clone)]
pub struct IdbStore {
    db_name: String,
}

impl Default for IdbStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdbStore {
    /// Create a store using the default `"nutritrack"` database.
    pub fn new() -> Self {
        Self {
            db_name: DEFAULT_DB_NAME.to_string(),
        }
    }

    async fn open_db(&self) -> Result<Rexie, StorageError> {
        Rexie::builder(&self.db_name)
            .version(DB_VERSION)
            .add_object_store(RexieObjectStore::new(KV_STORE))
            .build()
            .await
            .map_err(backend)
    }
}

impl KeyValueStore for IdbStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        let db = self.open_db().await?;
        let tx = db
            .transaction(&[KV_STORE], TransactionMode::ReadOnly)
            .map_err(backend)?;
        let store = tx.store(KV_STORE).map_err(backend)?;

        let Some(js_val) = store.get(JsValue::from_str(key)).await.map_err(backend)? else {
            return Ok(None);
        };
        if js_val.is_undefined() || js_val.is_null() {
            return Ok(None);
        }
        let value: String = serde_wasm_bindgen::from_value(js_val).map_err(backend)?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let db = self.open_db().await?;
        let tx = db
            .transaction(&[KV_STORE], TransactionMode::ReadWrite)
            .map_err(backend)?;
        let store = tx.store(KV_STORE).map_err(backend)?;

        let js_key = JsValue::from_str(key);
        let js_value = serde_wasm_bindgen::to_value(value).map_err(backend)?;
        store.put(&js_value, Some(&js_key)).await.map_err(backend)?;
        tx.done().await.map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let db = self.open_db().await?;
        let tx = db
            .transaction(&[KV_STORE], TransactionMode::ReadWrite)
            .map_err(backend)?;
        let store = tx.store(KV_STORE).map_err(backend)?;

        store.delete(JsValue::from_str(key)).await.map_err(backend)?;
        tx.done().await.map_err(backend)?;
        Ok(())
    }
}

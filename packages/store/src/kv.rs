//! # Key-value storage: the durable slot behind the session
//!
//! [`KeyValueStore`] is the only persistence interface the session layer sees:
//! string values addressed by string keys, with three fallible async
//! operations. Implementations live in sibling modules ([`crate::memory`],
//! [`crate::file_store`], and `crate::idb` on the web).
//!
//! | Method | Missing key | Failure |
//! |--------|-------------|---------|
//! | [`get`](KeyValueStore::get) | `Ok(None)` | [`StorageError`] |
//! | [`set`](KeyValueStore::set) | creates the entry | [`StorageError`] |
//! | [`remove`](KeyValueStore::remove) | `Ok(())` | [`StorageError`] |
//!
//! Unlike a cache, a backend must never swallow an error: the session store
//! relies on every failure being reported so it can set `last_error`.

use crate::error::StorageError;

/// Async string storage addressed by key.
pub trait KeyValueStore {
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StorageError>>;
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>>;
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>>;
}

/// Rejects keys no backend can address.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

//! Platform key-value storage for the session store.
//!
//! - **Web** (WASM + `web` feature): IndexedDB via [`store::IdbStore`]
//! - **Desktop / Mobile** (native): filesystem via [`store::FileStore`] under
//!   `<data_dir>/nutritrack/`

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub type AppStore = store::IdbStore;

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
pub type AppStore = store::FileStore;

/// Create the storage backend for this platform.
pub fn make_store() -> AppStore {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::IdbStore::new()
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    {
        let base = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("nutritrack");
        tracing::debug!(path = %base.display(), "using file storage");
        store::FileStore::new(base)
    }
}

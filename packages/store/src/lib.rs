pub mod config;
pub mod error;
pub mod kv;

mod file_store;
pub use file_store::FileStore;

mod memory;
pub use memory::MemoryStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod idb;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use idb::IdbStore;

pub use config::{NutriTrackConfig, RoutesConfig, SessionConfig, DEFAULT_SESSION_KEY};
pub use error::{ConfigError, StorageError};
pub use kv::KeyValueStore;

//! # Filesystem-backed key-value store
//!
//! [`FileStore`] is a [`KeyValueStore`] implementation that keeps one file per
//! key under a base directory. It is used on desktop and mobile platforms to
//! retain the signed-in session across app restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! └── kv/
//!     ├── %40nutritrack_user     # value for key "@nutritrack_user"
//!     └── %40nutritrack_user.tmp # only while a write is in progress
//! ```
//!
//! Keys are percent-encoded so that any string maps to a single safe file
//! name (`[A-Za-z0-9_.-]` pass through, every other byte becomes `%XX`).
//!
//! ## Atomic writes
//!
//! [`set`](KeyValueStore::set) writes to a `.tmp` sibling and renames it over
//! the target, so a crash mid-write leaves either the old value or the new
//! one, never a truncated record.
//!
//! ## Platform data directories
//!
//! Use [`dirs::data_dir()`] to obtain a platform-appropriate base:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS / iOS | `~/Library/Application Support/nutritrack/` |
//! | Linux | `~/.local/share/nutritrack/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\nutritrack\` |
//! | Android | App-internal storage (via `dirs`) |
//!
//! [`dirs::data_dir()`]: https://docs.rs/dirs

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::StorageError;
use crate::kv::{check_key, KeyValueStore};

/// Filesystem-backed KeyValueStore for desktop and mobile persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn kv_dir(&self) -> PathBuf {
        self.base.join("kv")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.kv_dir().join(encode_key(key))
    }
}

/// Percent-encode a key into a file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.') {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        std::fs::create_dir_all(self.kv_dir()).map_err(|e| io_error(key, e))?;

        let path = self.entry_path(key);
        let tmp = self.kv_dir().join(format!("{}.tmp", encode_key(key)));
        std::fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_error(key, e));
        }
        tracing::debug!(key, bytes = value.len(), "file store entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_base(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "nutritrack_store_{name}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("@nutritrack_user"), "%40nutritrack_user");
        assert_eq!(encode_key("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_key("plain-key.v1"), "plain-key.v1");
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = temp_base("roundtrip");

        let store = FileStore::new(dir.clone());
        store.set("@nutritrack_user", "{\"userId\":\"u1\"}").await.unwrap();

        // Re-open from same directory
        let store2 = FileStore::new(dir.clone());
        assert_eq!(
            store2.get("@nutritrack_user").await.unwrap().as_deref(),
            Some("{\"userId\":\"u1\"}")
        );
        assert!(dir.join("kv").join("%40nutritrack_user").exists());
        assert!(!dir.join("kv").join("%40nutritrack_user.tmp").exists());

        // Cleanup
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_missing_entry_and_remove() {
        let dir = temp_base("missing");
        let store = FileStore::new(dir.clone());

        // Fresh install: no directory at all
        assert_eq!(store.get("@nutritrack_user").await.unwrap(), None);
        store.remove("@nutritrack_user").await.unwrap();

        store.set("@nutritrack_user", "v").await.unwrap();
        store.remove("@nutritrack_user").await.unwrap();
        assert_eq!(store.get("@nutritrack_user").await.unwrap(), None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_unwritable_base_reports_error() {
        let dir = temp_base("unwritable");
        std::fs::create_dir_all(dir.parent().unwrap()).unwrap();
        // A plain file where the base directory should be
        std::fs::write(&dir, b"not a directory").unwrap();

        let store = FileStore::new(dir.clone());
        assert!(matches!(
            store.set("k", "v").await,
            Err(StorageError::Io { .. })
        ));

        let _ = std::fs::remove_file(&dir);
    }
}

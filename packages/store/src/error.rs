//! Storage and configuration errors.

use thiserror::Error;

/// A failed storage operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("i/o error on {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A configuration file that parses but cannot be used.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("session.storage_key must not be empty")]
    EmptyStorageKey,

    #[error("login route {0:?} is not an auth route")]
    LoginNotAuth(String),

    #[error("home route {0:?} is not a protected route")]
    HomeNotProtected(String),

    #[error("allow-listed route {0:?} is not an auth route")]
    AllowNotAuth(String),

    #[error("route {0:?} is listed as both auth and protected")]
    Overlap(String),
}

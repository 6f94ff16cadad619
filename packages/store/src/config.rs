//! # App configuration: `nutritrack.toml`
//!
//! Defines the TOML configuration the app reads at startup (filename:
//! [`NutriTrackConfig::filename`] = `"nutritrack.toml"`). It names the storage
//! slot that holds the session and describes the navigation metadata the
//! access gate classifies routes with.
//!
//! ## Structure
//!
//! ```toml
//! [session]
//! storage_key = "@nutritrack_user"
//!
//! [routes]
//! login = "/login"
//! home = "/"
//! auth = ["/login", "/signup", "/add-meal"]
//! protected = ["/", "/explore", "/profile"]
//! allow = ["/add-meal"]
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`NutriTrackConfig`] | Top-level config. TOML (de)serialisation, validation, and the canonical filename. |
//! | [`SessionConfig`] | Session section: the durable storage key. |
//! | [`RoutesConfig`] | Routes section: login/home targets, the two route groups, and the allow-list. |
//!
//! All structs implement `Default` with the production values, so a missing
//! or empty config file is equivalent to the default configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Storage key under which the serialized session lives.
pub const DEFAULT_SESSION_KEY: &str = "@nutritrack_user";

/// Top-level configuration stored in `nutritrack.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NutriTrackConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Session persistence configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
        }
    }
}

/// Navigation metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Where a visitor without a session is sent.
    #[serde(default = "default_login")]
    pub login: String,
    /// Default protected landing route for a signed-in user.
    #[serde(default = "default_home")]
    pub home: String,
    /// Routes that require the absence of a session.
    #[serde(default = "default_auth")]
    pub auth: Vec<String>,
    /// Routes that require a session. Unlisted routes are treated the same.
    #[serde(default = "default_protected")]
    pub protected: Vec<String>,
    /// Auth routes reachable regardless of session state.
    #[serde(default = "default_allow")]
    pub allow: Vec<String>,
}

fn default_login() -> String {
    "/login".to_string()
}

fn default_home() -> String {
    "/".to_string()
}

fn default_auth() -> Vec<String> {
    vec![
        "/login".to_string(),
        "/signup".to_string(),
        "/add-meal".to_string(),
    ]
}

fn default_protected() -> Vec<String> {
    vec!["/".to_string(), "/explore".to_string(), "/profile".to_string()]
}

fn default_allow() -> Vec<String> {
    vec!["/add-meal".to_string()]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login: default_login(),
            home: default_home(),
            auth: default_auth(),
            protected: default_protected(),
            allow: default_allow(),
        }
    }
}

impl NutriTrackConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "nutritrack.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        let routes = &self.routes;
        if let Some(both) = routes.auth.iter().find(|r| routes.protected.contains(r)) {
            return Err(ConfigError::Overlap(both.clone()));
        }
        if !routes.auth.contains(&routes.login) {
            return Err(ConfigError::LoginNotAuth(routes.login.clone()));
        }
        if !routes.protected.contains(&routes.home) {
            return Err(ConfigError::HomeNotProtected(routes.home.clone()));
        }
        if let Some(stray) = routes.allow.iter().find(|r| !routes.auth.contains(r)) {
            return Err(ConfigError::AllowNotAuth(stray.clone()));
        }
        Ok(())
    }
}

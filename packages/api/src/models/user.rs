//! # Provider payloads
//!
//! Deserialization targets for the auth provider's REST responses. They are
//! deliberately loose (every field the provider might omit is an `Option`):
//! deciding which fields are *required* is the job of the typed conversion
//! into a local session, which fails when they are absent instead of
//! defaulting.
//!
//! ## Types
//!
//! - [`ProviderUser`] — the `user` object: id, email, and free-form
//!   `user_metadata`. [`ProviderUser::display_name`] reads `name`, then
//!   `username` (the key sign-up writes).
//! - [`ProviderSession`] — a token grant: access/refresh tokens plus the user.
//! - [`AuthPayload`] — what a successful sign-in or sign-up yields. Sign-up
//!   may return only a user when the provider requires email confirmation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The provider's user object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl ProviderUser {
    /// Display name from metadata: `name`, falling back to `username`.
    pub fn display_name(&self) -> Option<&str> {
        ["name", "username"]
            .iter()
            .filter_map(|k| self.user_metadata.get(*k))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// A token grant returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: ProviderUser,
}

/// Result of a successful sign-in or sign-up.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthPayload {
    pub session: Option<ProviderSession>,
    pub user: Option<ProviderUser>,
}

impl AuthPayload {
    /// The user, from the session if there is one.
    pub fn user(&self) -> Option<&ProviderUser> {
        self.session
            .as_ref()
            .map(|s| &s.user)
            .or(self.user.as_ref())
    }

    /// Whether the provider issued tokens (false while email confirmation is pending).
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }
}

/// Sign-up answers with either a full grant or a bare user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(ProviderSession),
    User(ProviderUser),
}

impl From<SignUpResponse> for AuthPayload {
    fn from(resp: SignUpResponse) -> Self {
        match resp {
            SignUpResponse::Session(session) => AuthPayload {
                session: Some(session),
                user: None,
            },
            SignUpResponse::User(user) => AuthPayload {
                session: None,
                user: Some(user),
            },
        }
    }
}

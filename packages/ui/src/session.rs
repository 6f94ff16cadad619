//! # Session store: the single source of truth for "who is signed in"
//!
//! [`SessionStore`] owns the in-memory [`AuthState`] and mediates every read
//! and write of the persisted [`Session`] record. It is generic over a
//! [`KeyValueStore`] and uses one fixed key (default `"@nutritrack_user"`).
//!
//! ## Operations
//!
//! | Method | Storage call | On success | On failure |
//! |--------|--------------|------------|------------|
//! | [`load`](SessionStore::load) | `get` | session restored (or none) | signed out, `StorageReadFailure` |
//! | [`sign_in`](SessionStore::sign_in) | `set` | session replaced | previous session kept, `StorageWriteFailure` |
//! | [`sign_out`](SessionStore::sign_out) / [`invalidate`](SessionStore::invalidate) | `remove` | session cleared | session cleared, `StorageDeleteFailure` |
//! | [`purge_stale`](SessionStore::purge_stale) | `remove` | `last_error` cleared | unchanged |
//!
//! `loading` is true from construction until `load` settles, and again while
//! a `sign_in`/`sign_out` write is outstanding. `loading` always returns to
//! false, whatever the storage does.
//!
//! ## Critical section
//!
//! All operations share one in-flight guard. A call made while another is
//! outstanding fails with [`SessionError::Busy`] without touching state or
//! storage. In-memory state only changes after the storage call resolves.
//! Everything but `load` fails with [`SessionError::NotLoaded`] until `load`
//! has settled.
//!
//! [`sign_in_with`](SessionStore::sign_in_with) and
//! [`sign_out_with`](SessionStore::sign_out_with) hold the guard across a
//! caller-supplied future as well, so a remote auth call and the matching
//! storage write form one operation.
//!
//! ## Observers
//!
//! [`subscribe`](SessionStore::subscribe) registers a callback that runs
//! synchronously after every state change. The UI mirrors the state into a
//! signal this way, so the access gate is re-evaluated as soon as the state
//! settles.
//!
//! The store is `!Send`: it lives on the UI event loop and is shared through
//! an `Rc`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;

use api::{AuthError, AuthPayload, SignUpError};
use serde::{Deserialize, Serialize};
use store::{KeyValueStore, StorageError};
use thiserror::Error;

/// The locally held record of the signed-in user.
///
/// Always carries a non-empty user id: construction and deserialization
/// both reject an empty one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord", into = "SessionRecord")]
pub struct Session {
    user_id: String,
    email: String,
    display_name: Option<String>,
    access_token: Option<String>,
}

/// Wire shape of a persisted session.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    user_id: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

impl TryFrom<SessionRecord> for Session {
    type Error = SessionError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Session::new(record.user_id, record.email)?
            .with_display_name(record.display_name)
            .with_access_token(record.access_token))
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        SessionRecord {
            user_id: session.user_id,
            email: session.email,
            display_name: session.display_name,
            access_token: session.access_token,
        }
    }
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Result<Self, SessionError> {
        let user_id: String = user_id.into();
        if user_id.trim().is_empty() {
            return Err(SessionError::MissingUserId);
        }
        Ok(Self {
            user_id,
            email: email.into(),
            display_name: None,
            access_token: None,
        })
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    /// Build a session from a provider payload. Fails when the provider did
    /// not return a user id or email.
    pub fn from_provider(payload: &AuthPayload) -> Result<Self, SessionError> {
        let user = payload.user().ok_or(SessionError::MissingField("user"))?;
        let user_id = user.id.clone().unwrap_or_default();
        let email = user
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or(SessionError::MissingField("user.email"))?;

        Ok(Session::new(user_id, email)?
            .with_display_name(user.display_name().map(str::to_string))
            .with_access_token(payload.session.as_ref().map(|s| s.access_token.clone())))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Name to show in the UI, falling back to the email.
    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Classification of a failure, as recorded in [`AuthState::last_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StorageReadFailure,
    StorageWriteFailure,
    StorageDeleteFailure,
    AuthProviderFailure,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read persisted session: {0}")]
    Read(#[source] StorageError),

    #[error("persisted session is unreadable: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode session: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to persist session: {0}")]
    Write(#[source] StorageError),

    #[error("failed to remove persisted session: {0}")]
    Delete(#[source] StorageError),

    #[error(transparent)]
    Provider(#[from] AuthError),

    #[error(transparent)]
    SignUp(#[from] SignUpError),

    #[error("session has no user id")]
    MissingUserId,

    #[error("auth provider response is missing {0}")]
    MissingField(&'static str),

    #[error("another session operation is in progress")]
    Busy,

    #[error("persisted session was already loaded")]
    AlreadyLoaded,

    #[error("persisted session has not been loaded yet")]
    NotLoaded,
}

impl SessionError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SessionError::Read(_) | SessionError::Corrupt(_) => Some(ErrorKind::StorageReadFailure),
            SessionError::Encode(_) | SessionError::Write(_) => Some(ErrorKind::StorageWriteFailure),
            SessionError::Delete(_) => Some(ErrorKind::StorageDeleteFailure),
            SessionError::Provider(_) => Some(ErrorKind::AuthProviderFailure),
            _ => None,
        }
    }
}

/// Snapshot of the session store's state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub loading: bool,
    pub last_error: Option<ErrorKind>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true,
            last_error: None,
        }
    }
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Signed out, but the persisted entry could not be removed.
    pub fn has_stale_entry(&self) -> bool {
        !self.loading
            && self.session.is_none()
            && self.last_error == Some(ErrorKind::StorageDeleteFailure)
    }
}

impl ErrorKind {
    /// Short explanation for the user.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::StorageReadFailure => "Your saved session could not be read. Please sign in again.",
            ErrorKind::StorageWriteFailure => "You are signed in, but this device could not save the session.",
            ErrorKind::StorageDeleteFailure => {
                "You were signed out, but this device could not forget the session. We will retry."
            }
            ErrorKind::AuthProviderFailure => "The sign-in service could not complete the request.",
        }
    }
}

type Listener = Box<dyn FnMut(&AuthState)>;

/// Clears the in-flight flag when an operation ends, however it ends.
struct OpGuard<'a> {
    busy: &'a Cell<bool>,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

pub struct SessionStore<S> {
    storage: S,
    key: String,
    state: RefCell<AuthState>,
    load_started: Cell<bool>,
    settled: Cell<bool>,
    busy: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            state: RefCell::new(AuthState::default()),
            load_started: Cell::new(false),
            settled: Cell::new(false),
            busy: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.state.borrow().last_error
    }

    /// Whether an operation is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Whether the initial load has completed (successfully or not).
    pub fn is_settled(&self) -> bool {
        self.settled.get()
    }

    /// Register a callback run after every state change.
    pub fn subscribe(&self, listener: impl FnMut(&AuthState) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Like [`begin`](Self::begin), but only once the initial load has settled.
    fn begin_loaded(&self) -> Result<OpGuard<'_>, SessionError> {
        if !self.settled.get() {
            return Err(SessionError::NotLoaded);
        }
        self.begin()
    }

    fn begin(&self) -> Result<OpGuard<'_>, SessionError> {
        if self.busy.replace(true) {
            return Err(SessionError::Busy);
        }
        Ok(OpGuard { busy: &self.busy })
    }

    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let before = state.clone();
            f(&mut state);
            *state != before
        };
        if changed {
            self.notify();
        }
    }

    fn notify(&self) {
        let snapshot = self.state();
        // Listeners are taken out so one may subscribe another without a double borrow.
        let mut listeners = self.listeners.take();
        for listener in listeners.iter_mut() {
            listener(&snapshot);
        }
        let mut slot = self.listeners.borrow_mut();
        listeners.append(&mut slot);
        *slot = listeners;
    }

    /// Restore the persisted session. Runs once per store.
    ///
    /// Failures leave the store signed out with `last_error` set; the error is
    /// also returned so the caller can log it.
    pub async fn load(&self) -> Result<Option<Session>, SessionError> {
        let _op = self.begin()?;
        if self.load_started.replace(true) {
            return Err(SessionError::AlreadyLoaded);
        }

        let result = self.read_persisted().await;
        self.settled.set(true);
        match result {
            Ok(session) => {
                match &session {
                    Some(s) => tracing::info!(user_id = s.user_id(), "restored persisted session"),
                    None => tracing::info!("no persisted session"),
                }
                let restored = session.clone();
                self.update(move |s| {
                    s.session = restored;
                    s.loading = false;
                    s.last_error = None;
                });
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted session unavailable, starting signed out");
                let kind = e.kind();
                self.update(move |s| {
                    s.session = None;
                    s.loading = false;
                    s.last_error = kind;
                });
                Err(e)
            }
        }
    }

    async fn read_persisted(&self) -> Result<Option<Session>, SessionError> {
        let raw = self
            .storage
            .get(&self.key)
            .await
            .map_err(SessionError::Read)?;
        raw.map(|r| serde_json::from_str::<Session>(&r).map_err(SessionError::Corrupt))
            .transpose()
    }

    /// Persist `candidate`, then make it the current session.
    ///
    /// On failure the previous session (if any) stays current. Rejected with
    /// [`SessionError::NotLoaded`] until [`load`](Self::load) has settled.
    pub async fn sign_in(&self, candidate: Session) -> Result<(), SessionError> {
        let _op = self.begin_loaded()?;
        self.commit(candidate).await
    }

    /// Sign in with a session produced by `fetch`, holding the in-flight guard
    /// across both the fetch and the write.
    ///
    /// A failed fetch leaves state untouched; nothing is persisted.
    pub async fn sign_in_with<F, Fut>(&self, fetch: F) -> Result<Session, SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Session, SessionError>>,
    {
        let _op = self.begin_loaded()?;
        let session = fetch().await?;
        self.commit(session.clone()).await?;
        Ok(session)
    }

    async fn commit(&self, candidate: Session) -> Result<(), SessionError> {
        self.update(|s| s.loading = true);

        match self.persist(&candidate).await {
            Ok(()) => {
                tracing::info!(user_id = candidate.user_id(), "signed in");
                self.update(move |s| {
                    s.session = Some(candidate);
                    s.loading = false;
                    s.last_error = None;
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = candidate.user_id(), "sign-in not persisted");
                let kind = e.kind();
                self.update(move |s| {
                    s.loading = false;
                    s.last_error = kind;
                });
                Err(e)
            }
        }
    }

    async fn persist(&self, session: &Session) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(session).map_err(SessionError::Encode)?;
        self.storage
            .set(&self.key, &encoded)
            .await
            .map_err(SessionError::Write)
    }

    /// Remove the persisted session and clear the current one.
    ///
    /// The session is cleared locally even when removal fails; the failure is
    /// returned and recorded as `StorageDeleteFailure`.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let _op = self.begin_loaded()?;
        self.clear("sign-out").await
    }

    /// Sign out, first handing the current access token (if any) to `revoke`
    /// under the same in-flight guard.
    ///
    /// The local sign-out runs whatever `revoke` returns. A local failure
    /// takes precedence over a `revoke` failure.
    pub async fn sign_out_with<F, Fut>(&self, revoke: F) -> Result<(), SessionError>
    where
        F: FnOnce(Option<String>) -> Fut,
        Fut: Future<Output = Result<(), SessionError>>,
    {
        let _op = self.begin_loaded()?;
        let token = self
            .session()
            .and_then(|s| s.access_token().map(str::to_string));

        let remote = revoke(token).await;
        if let Err(e) = &remote {
            tracing::warn!(error = %e, "remote sign-out failed, clearing local session anyway");
        }
        self.clear("sign-out").await?;
        remote
    }

    /// Drop a session known to be stale. Same effect as [`sign_out`](Self::sign_out).
    pub async fn invalidate(&self) -> Result<(), SessionError> {
        let _op = self.begin_loaded()?;
        self.clear("invalidated").await
    }

    async fn clear(&self, reason: &'static str) -> Result<(), SessionError> {
        self.update(|s| s.loading = true);

        let result = self
            .storage
            .remove(&self.key)
            .await
            .map_err(SessionError::Delete);
        let kind = match &result {
            Ok(()) => {
                tracing::info!(reason, "session cleared");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, reason, "session cleared locally, persisted entry left behind");
                e.kind()
            }
        };
        self.update(move |s| {
            s.session = None;
            s.loading = false;
            s.last_error = kind;
        });
        result
    }

    /// Retry removing an entry a failed sign-out left behind.
    ///
    /// Returns `Ok(true)` when a stale entry was purged, `Ok(false)` when
    /// there was nothing to do.
    pub async fn purge_stale(&self) -> Result<bool, SessionError> {
        let _op = self.begin_loaded()?;
        if !self.state.borrow().has_stale_entry() {
            return Ok(false);
        }

        match self.storage.remove(&self.key).await {
            Ok(()) => {
                tracing::info!("stale persisted session purged");
                self.update(|s| s.last_error = None);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "stale persisted session still present");
                Err(SessionError::Delete(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use store::{MemoryStore, DEFAULT_SESSION_KEY};

    /// MemoryStore with switchable failures and an optional yield before each call.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_get: Cell<bool>,
        fail_set: Cell<bool>,
        fail_remove: Cell<bool>,
        yield_first: bool,
    }

    impl FlakyStore {
        fn over(inner: MemoryStore) -> Self {
            Self {
                inner,
                ..Self::default()
            }
        }

        async fn pause(&self) {
            if self.yield_first {
                tokio::task::yield_now().await;
            }
        }
    }

    fn injected() -> StorageError {
        StorageError::Backend("injected failure".to_string())
    }

    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.pause().await;
            if self.fail_get.get() {
                return Err(injected());
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.pause().await;
            if self.fail_set.get() {
                return Err(injected());
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.pause().await;
            if self.fail_remove.get() {
                return Err(injected());
            }
            self.inner.remove(key).await
        }
    }

    fn user(id: &str, email: &str) -> Session {
        Session::new(id, email).unwrap()
    }

    fn store_over(inner: &MemoryStore) -> SessionStore<FlakyStore> {
        SessionStore::new(FlakyStore::over(inner.clone()), DEFAULT_SESSION_KEY)
    }

    #[tokio::test]
    async fn test_fresh_install_loads_signed_out() {
        let store = store_over(&MemoryStore::new());
        assert!(store.is_loading());
        assert!(!store.is_settled());

        assert_eq!(store.load().await.unwrap(), None);

        let state = store.state();
        assert!(!state.loading);
        assert!(state.session.is_none());
        assert!(state.last_error.is_none());
        assert!(store.is_settled());
    }

    #[tokio::test]
    async fn test_sign_in_survives_restart() {
        let device = MemoryStore::new();

        let first = store_over(&device);
        first.load().await.unwrap();
        first.sign_in(user("u1", "a@b.com")).await.unwrap();

        let raw = device.get("@nutritrack_user").await.unwrap().unwrap();
        assert!(raw.contains("\"userId\":\"u1\""));
        assert!(raw.contains("\"email\":\"a@b.com\""));

        // New process, same device storage
        let second = store_over(&device);
        let loaded = second.load().await.unwrap().unwrap();
        assert_eq!(loaded, user("u1", "a@b.com"));
        assert_eq!(second.session().unwrap().user_id(), "u1");
    }

    #[tokio::test]
    async fn test_roundtrip_keeps_optional_fields() {
        let device = MemoryStore::new();
        let session = user("u9", "z@y.com")
            .with_display_name(Some("Zed".to_string()))
            .with_access_token(Some("tok".to_string()));

        let first = store_over(&device);
        first.load().await.unwrap();
        first.sign_in(session.clone()).await.unwrap();

        let second = store_over(&device);
        assert_eq!(second.load().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_load_runs_once() {
        let store = store_over(&MemoryStore::new());
        store.load().await.unwrap();
        assert!(matches!(store.load().await, Err(SessionError::AlreadyLoaded)));
    }

    #[tokio::test]
    async fn test_load_read_failure_absorbed() {
        let store = store_over(&MemoryStore::new());
        store.storage().fail_get.set(true);

        assert!(matches!(store.load().await, Err(SessionError::Read(_))));
        let state = store.state();
        assert!(!state.loading);
        assert!(state.session.is_none());
        assert_eq!(state.last_error, Some(ErrorKind::StorageReadFailure));
    }

    #[tokio::test]
    async fn test_load_corrupt_entry_absorbed() {
        let device = MemoryStore::new();
        device.set(DEFAULT_SESSION_KEY, "not json").await.unwrap();

        let store = store_over(&device);
        assert!(matches!(store.load().await, Err(SessionError::Corrupt(_))));
        assert!(!store.is_loading());
        assert_eq!(store.last_error(), Some(ErrorKind::StorageReadFailure));
    }

    #[tokio::test]
    async fn test_load_rejects_empty_user_id() {
        let device = MemoryStore::new();
        device
            .set(DEFAULT_SESSION_KEY, r#"{"userId":"","email":"a@b.com"}"#)
            .await
            .unwrap();

        let store = store_over(&device);
        assert!(store.load().await.is_err());
        assert!(store.session().is_none());
        assert_eq!(store.last_error(), Some(ErrorKind::StorageReadFailure));
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_previous_session() {
        let store = store_over(&MemoryStore::new());
        store.load().await.unwrap();
        store.sign_in(user("u1", "a@b.com")).await.unwrap();

        store.storage().fail_set.set(true);
        let err = store.sign_in(user("u2", "c@d.com")).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::StorageWriteFailure));

        let state = store.state();
        assert!(!state.loading);
        assert_eq!(state.session.unwrap().user_id(), "u1");
        assert_eq!(state.last_error, Some(ErrorKind::StorageWriteFailure));

        // Next success clears the error
        store.storage().fail_set.set(false);
        store.sign_in(user("u2", "c@d.com")).await.unwrap();
        assert!(store.last_error().is_none());
        assert_eq!(store.session().unwrap().user_id(), "u2");
    }

    #[tokio::test]
    async fn test_failed_first_sign_in_stays_signed_out() {
        let store = store_over(&MemoryStore::new());
        store.load().await.unwrap();
        store.storage().fail_set.set(true);

        assert!(store.sign_in(user("u1", "a@b.com")).await.is_err());
        assert!(store.session().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_and_storage() {
        let device = MemoryStore::new();
        let store = store_over(&device);
        store.load().await.unwrap();
        store.sign_in(user("u1", "a@b.com")).await.unwrap();

        store.sign_out().await.unwrap();
        assert!(store.session().is_none());
        assert!(store.last_error().is_none());
        assert_eq!(device.get(DEFAULT_SESSION_KEY).await.unwrap(), None);

        // Signed out again is harmless
        store.sign_out().await.unwrap();
        assert!(store.session().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_with_failing_delete() {
        let device = MemoryStore::new();
        let store = store_over(&device);
        store.load().await.unwrap();
        store.sign_in(user("u1", "a@b.com")).await.unwrap();

        store.storage().fail_remove.set(true);
        let err = store.sign_out().await.unwrap_err();
        assert!(matches!(err, SessionError::Delete(_)));

        let state = store.state();
        assert!(state.session.is_none());
        assert!(!state.loading);
        assert_eq!(state.last_error, Some(ErrorKind::StorageDeleteFailure));
        // The stale entry is still on the device
        assert!(device.get(DEFAULT_SESSION_KEY).await.unwrap().is_some());

        // Still failing: nothing changes
        assert!(store.purge_stale().await.is_err());
        assert_eq!(store.last_error(), Some(ErrorKind::StorageDeleteFailure));

        store.storage().fail_remove.set(false);
        assert!(store.purge_stale().await.unwrap());
        assert!(store.last_error().is_none());
        assert_eq!(device.get(DEFAULT_SESSION_KEY).await.unwrap(), None);

        // Nothing left to purge
        assert!(!store.purge_stale().await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidate_clears_session() {
        let store = store_over(&MemoryStore::new());
        store.load().await.unwrap();
        store.sign_in(user("u1", "a@b.com")).await.unwrap();

        store.invalidate().await.unwrap();
        assert!(store.session().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_operations_rejected() {
        let inner = MemoryStore::new();
        let store = SessionStore::new(
            FlakyStore {
                inner: inner.clone(),
                yield_first: true,
                ..FlakyStore::default()
            },
            DEFAULT_SESSION_KEY,
        );
        store.load().await.unwrap();

        let (first, second) = tokio::join!(
            store.sign_in(user("u1", "a@b.com")),
            store.sign_in(user("u2", "c@d.com")),
        );
        assert!(first.is_ok());
        assert!(matches!(second, Err(SessionError::Busy)));
        assert_eq!(store.session().unwrap().user_id(), "u1");

        let (sign_in, sign_out) = tokio::join!(store.sign_in(user("u3", "e@f.com")), store.sign_out());
        assert!(sign_in.is_ok());
        assert!(matches!(sign_out, Err(SessionError::Busy)));
        assert_eq!(store.session().unwrap().user_id(), "u3");

        // Guard released after each operation
        assert!(!store.is_busy());
        store.sign_out().await.unwrap();
        assert!(store.session().is_none());
    }

    #[tokio::test]
    async fn test_observers_see_loading_during_write() {
        let store = store_over(&MemoryStore::new());
        let seen: Rc<RefCell<Vec<AuthState>>> = Rc::default();
        let sink = seen.clone();
        store.subscribe(move |state| sink.borrow_mut().push(state.clone()));

        store.load().await.unwrap();
        store.sign_in(user("u1", "a@b.com")).await.unwrap();
        store.sign_out().await.unwrap();

        let seen = seen.borrow();
        let flags: Vec<(bool, bool)> = seen
            .iter()
            .map(|s| (s.loading, s.session.is_some()))
            .collect();
        assert_eq!(
            flags,
            vec![
                (false, false), // load settled
                (true, false),  // sign-in write outstanding
                (false, true),  // signed in
                (true, true),   // sign-out remove outstanding
                (false, false), // signed out
            ]
        );
    }

    #[test]
    fn test_session_requires_user_id() {
        assert!(matches!(Session::new("", "a@b.com"), Err(SessionError::MissingUserId)));
        assert!(matches!(Session::new("  ", "a@b.com"), Err(SessionError::MissingUserId)));
        assert_eq!(user("u1", "a@b.com").display_label(), "a@b.com");
        assert_eq!(
            user("u1", "a@b.com")
                .with_display_name(Some("Ann".to_string()))
                .display_label(),
            "Ann"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = user("u1", "a@b.com").with_access_token(Some("secret-token".to_string()));
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_from_provider_payload() {
        let payload = AuthPayload {
            session: Some(
                serde_json::from_str(
                    r#"{"access_token":"tok","user":{"id":"u1","email":"a@b.com","user_metadata":{"username":"ann"}}}"#,
                )
                .unwrap(),
            ),
            user: None,
        };
        let session = Session::from_provider(&payload).unwrap();
        assert_eq!(session.user_id(), "u1");
        assert_eq!(session.email(), "a@b.com");
        assert_eq!(session.display_name(), Some("ann"));
        assert_eq!(session.access_token(), Some("tok"));
    }

    #[test]
    fn test_from_provider_fails_loudly() {
        let no_id: AuthPayload = AuthPayload {
            session: None,
            user: Some(serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap()),
        };
        assert!(matches!(
            Session::from_provider(&no_id),
            Err(SessionError::MissingUserId)
        ));

        let no_email = AuthPayload {
            session: None,
            user: Some(serde_json::from_str(r#"{"id":"u1"}"#).unwrap()),
        };
        assert!(matches!(
            Session::from_provider(&no_email),
            Err(SessionError::MissingField("user.email"))
        ));

        let empty = AuthPayload {
            session: None,
            user: None,
        };
        assert!(matches!(
            Session::from_provider(&empty),
            Err(SessionError::MissingField("user"))
        ));
    }

    #[tokio::test]
    async fn test_writes_rejected_until_loaded() {
        let device = MemoryStore::new();
        let earlier = store_over(&device);
        earlier.load().await.unwrap();
        earlier.sign_in(user("u1", "a@b.com")).await.unwrap();

        let store = store_over(&device);
        assert!(matches!(
            store.sign_in(user("u2", "c@d.com")).await,
            Err(SessionError::NotLoaded)
        ));
        assert!(matches!(store.sign_out().await, Err(SessionError::NotLoaded)));
        assert!(matches!(store.invalidate().await, Err(SessionError::NotLoaded)));
        assert!(matches!(store.purge_stale().await, Err(SessionError::NotLoaded)));

        // Nothing moved: still loading, nothing decided, storage untouched
        assert!(store.is_loading());
        assert!(!store.is_settled());
        assert!(store.session().is_none());
        assert_eq!(store.load().await.unwrap().unwrap().user_id(), "u1");
    }

    #[tokio::test]
    async fn test_sign_in_with_holds_guard_across_fetch() {
        let store = store_over(&MemoryStore::new());
        store.load().await.unwrap();
        let fetches = Cell::new(0);
        let counter = &fetches;

        let fetch = move |id: &'static str| {
            move || async move {
                counter.set(counter.get() + 1);
                tokio::task::yield_now().await;
                Session::new(id, "a@b.com")
            }
        };
        let (first, second) = tokio::join!(
            store.sign_in_with(fetch("u1")),
            store.sign_in_with(fetch("u2")),
        );
        assert_eq!(first.unwrap().user_id(), "u1");
        assert!(matches!(second, Err(SessionError::Busy)));
        assert_eq!(fetches.get(), 1);
        assert_eq!(store.session().unwrap().user_id(), "u1");
    }

    #[tokio::test]
    async fn test_sign_in_with_failed_fetch_changes_nothing() {
        let device = MemoryStore::new();
        let store = store_over(&device);
        store.load().await.unwrap();
        let before = store.state();

        let result = store
            .sign_in_with(|| async { Err(SessionError::Provider(AuthError::InvalidCredentials)) })
            .await;
        assert!(matches!(result, Err(SessionError::Provider(_))));
        assert_eq!(store.state(), before);
        assert!(!store.is_busy());
        assert_eq!(device.get(DEFAULT_SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_out_with_passes_token_and_always_clears() {
        let store = store_over(&MemoryStore::new());
        store.load().await.unwrap();
        store
            .sign_in(user("u1", "a@b.com").with_access_token(Some("tok".to_string())))
            .await
            .unwrap();

        let seen = RefCell::new(None);
        let result = store
            .sign_out_with(|token| {
                *seen.borrow_mut() = token;
                async { Err(SessionError::Provider(AuthError::Network("offline".to_string()))) }
            })
            .await;
        assert!(matches!(result, Err(SessionError::Provider(_))));
        assert_eq!(seen.borrow().as_deref(), Some("tok"));
        assert!(store.session().is_none());
        assert!(store.last_error().is_none());
    }

    #[tokio::test]
    async fn test_stale_entry_flag_follows_failed_sign_out() {
        let store = store_over(&MemoryStore::new());
        store.load().await.unwrap();
        assert!(!store.state().has_stale_entry());
        store.sign_in(user("u1", "a@b.com")).await.unwrap();

        store.storage().fail_remove.set(true);
        let _ = store.sign_out().await;
        assert!(store.state().has_stale_entry());

        store.storage().fail_remove.set(false);
        assert!(store.purge_stale().await.unwrap());
        assert!(!store.state().has_stale_entry());
    }

    #[test]
    fn test_error_kinds_have_user_messages() {
        for kind in [
            ErrorKind::StorageReadFailure,
            ErrorKind::StorageWriteFailure,
            ErrorKind::StorageDeleteFailure,
            ErrorKind::AuthProviderFailure,
        ] {
            assert!(!kind.user_message().is_empty());
        }
        assert!(ErrorKind::StorageDeleteFailure
            .user_message()
            .contains("signed out"));
    }
}

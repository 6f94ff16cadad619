//! Shared session, gating and auth UI for the NutriTrack frontends.
//!
//! The non-UI pieces ([`session`], [`gate`], [`account`]) are plain Rust and
//! tested without a renderer; [`auth`] binds them to Dioxus context.

pub mod account;
pub mod gate;
pub mod session;

mod auth;
pub use auth::{use_auth, use_session, AccessGate, AuthProvider, LogoutButton, RouteGuard, SessionHandle};

mod storage;
pub use storage::{make_store, AppStore};

pub use account::{sign_in_with_password, sign_out_everywhere, sign_up};
pub use gate::{decide, guard_screen, normalize_path, Decision, RouteKind, RouteTable, ScreenGuard};
pub use session::{AuthState, ErrorKind, Session, SessionError, SessionStore};

//! Remote authentication provider.
//!
//! [`AuthClient`] is the seam between the app and whatever service owns the
//! user accounts. The session layer only ever consumes its success payloads;
//! it never re-implements the provider's checks.

mod config;
mod error;
mod signup;
mod supabase;

pub use config::SupabaseConfig;
pub use error::{AuthError, SignUpError};
pub use signup::{is_valid_email, SignUpRequest};
pub use supabase::{classify_error, SupabaseAuth};

use crate::models::AuthPayload;

/// Async interface to the remote auth provider.
pub trait AuthClient {
    /// Create an account. The payload has no session while email confirmation is pending.
    fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> impl std::future::Future<Output = Result<AuthPayload, AuthError>>;

    /// Exchange email and password for a token grant.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthPayload, AuthError>>;

    /// Revoke the grant identified by `access_token`.
    fn sign_out(
        &self,
        access_token: &str,
    ) -> impl std::future::Future<Output = Result<(), AuthError>>;
}

//! Account flows: the auth provider and the session store together.
//!
//! Provider failures come back as [`SessionError::Provider`] and never touch
//! the session store.

use api::{AuthClient, AuthPayload, SignUpRequest};
use store::KeyValueStore;

use crate::session::{Session, SessionError, SessionStore};

/// Sign in with email and password, then persist the resulting session.
///
/// The provider call and the write run as one store operation, so a second
/// sign-in or sign-out started meanwhile fails with `Busy` before reaching
/// the provider.
pub async fn sign_in_with_password<C, S>(
    client: &C,
    store: &SessionStore<S>,
    email: &str,
    password: &str,
) -> Result<Session, SessionError>
where
    C: AuthClient,
    S: KeyValueStore,
{
    let email = email.trim();
    store
        .sign_in_with(|| async move {
            let payload = client.sign_in(email, password).await.map_err(|e| {
                tracing::warn!(error = %e, "sign-in rejected by auth provider");
                SessionError::Provider(e)
            })?;
            Session::from_provider(&payload)
        })
        .await
}

/// Validate the sign-up form and create the account.
///
/// Does not sign in: the caller routes back to login, since the provider may
/// require email confirmation first.
pub async fn sign_up<C: AuthClient>(
    client: &C,
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<AuthPayload, SessionError> {
    let request = SignUpRequest::new(name, email, password, confirm_password)?;
    client.sign_up(&request).await.map_err(|e| {
        tracing::warn!(error = %e, "sign-up rejected by auth provider");
        SessionError::Provider(e)
    })
}

/// Revoke the provider grant (best effort) and sign out locally.
///
/// The local sign-out always runs. A local storage failure takes precedence
/// in the returned error; otherwise a provider failure is returned.
pub async fn sign_out_everywhere<C, S>(client: &C, store: &SessionStore<S>) -> Result<(), SessionError>
where
    C: AuthClient,
    S: KeyValueStore,
{
    store
        .sign_out_with(|token| async move {
            match token {
                Some(token) => client.sign_out(&token).await.map_err(SessionError::Provider),
                None => Ok(()),
            }
        })
        .await
}

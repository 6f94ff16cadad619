//! # Supabase GoTrue client
//!
//! [`SupabaseAuth`] implements [`AuthClient`] against the `/auth/v1` REST
//! surface of a Supabase project.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | sign-up | `POST /auth/v1/signup` `{email, password, data: {username}}` |
//! | sign-in | `POST /auth/v1/token?grant_type=password` `{email, password}` |
//! | sign-out | `POST /auth/v1/logout` with `Authorization: Bearer <access_token>` |
//!
//! Every request carries the project's anon key in the `apikey` header.
//!
//! ## Error mapping
//!
//! Non-2xx responses go through [`classify_error`], which reads whichever of
//! `error_code` / `error` / `msg` / `message` / `error_description` the
//! provider sent and maps the two cases the UI treats specially (bad
//! credentials, duplicate account). Everything else keeps the provider's
//! status and message.

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use super::config::SupabaseConfig;
use super::error::AuthError;
use super::signup::SignUpRequest;
use super::AuthClient;
use crate::models::user::SignUpResponse;
use crate::models::{AuthPayload, ProviderSession};

/// Error body fields across GoTrue versions.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

/// Map a failed response to an [`AuthError`].
pub fn classify_error(status: u16, body: &str) -> AuthError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed
        .error_code
        .as_deref()
        .or(parsed.error.as_deref())
        .unwrap_or_default();
    let message = parsed
        .msg
        .or(parsed.message)
        .or(parsed.error_description)
        .unwrap_or_else(|| body.trim().to_string());

    let lowered = message.to_lowercase();
    if code == "invalid_credentials"
        || (code == "invalid_grant" && lowered.contains("credentials"))
        || lowered.contains("invalid login credentials")
    {
        return AuthError::InvalidCredentials;
    }
    if code == "user_already_exists"
        || code == "email_exists"
        || lowered.contains("already registered")
    {
        return AuthError::DuplicateAccount;
    }

    AuthError::Rejected { status, message }
}

/// HTTP client for a Supabase project's auth endpoints.
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    http: Client,
    config: SupabaseConfig,
}

impl SupabaseAuth {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Build from `SUPABASE_URL` / `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self::new(SupabaseConfig::from_env()?))
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(self.config.endpoint(path))
            .header("apikey", &self.config.anon_key)
    }

    async fn check(resp: Response) -> Result<Response, AuthError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }
}

impl AuthClient for SupabaseAuth {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthPayload, AuthError> {
        let resp = self
            .post("signup")
            .json(&json!({
                "email": request.email,
                "password": request.password,
                "data": { "username": request.name },
            }))
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let body: SignUpResponse = resp.json().await?;
        let payload = AuthPayload::from(body);
        tracing::info!(
            email = %request.email,
            confirmed = payload.is_signed_in(),
            "provider sign-up succeeded"
        );
        Ok(payload)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthPayload, AuthError> {
        let resp = self
            .post("token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let session: ProviderSession = resp.json().await?;
        tracing::info!(email, "provider sign-in succeeded");
        Ok(AuthPayload {
            session: Some(session),
            user: None,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let resp = self
            .post("logout")
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::check(resp).await?;
        tracing::info!("provider sign-out succeeded");
        Ok(())
    }
}

//! Auth provider configuration from environment variables.

use super::error::AuthError;

/// Supabase project settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    /// Project URL without a trailing slash, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public anon key sent as the `apikey` header.
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Read `SUPABASE_URL` and `SUPABASE_ANON_KEY`, loading `.env` first.
    pub fn from_env() -> Result<Self, AuthError> {
        dotenvy::dotenv().ok();

        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| AuthError::Config("SUPABASE_URL not set".to_string()))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| AuthError::Config("SUPABASE_ANON_KEY not set".to_string()))?;

        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(AuthError::Config(format!(
                "SUPABASE_URL must be an http(s) URL, got {url:?}"
            )));
        }

        Ok(Self::new(url, anon_key))
    }

    /// Full URL of an auth endpoint, e.g. `endpoint("logout")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
    }
}

//! Auth provider errors.

use thiserror::Error;

/// A failed call to the remote auth provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    DuplicateAccount,

    #[error("network error: {0}")]
    Network(String),

    #[error("auth provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed auth provider response: {0}")]
    MalformedResponse(String),

    #[error("auth provider not configured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AuthError::MalformedResponse(e.to_string())
        } else {
            AuthError::Network(e.to_string())
        }
    }
}

/// A sign-up form that must not be sent to the provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SignUpError {
    #[error("please fill in all required fields")]
    MissingField,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("please enter a valid email address")]
    InvalidEmail,
}

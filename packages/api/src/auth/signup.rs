//! Sign-up form validation.
//!
//! Checks run client-side before anything reaches the provider: every field
//! present, the two password entries equal, and an email shaped like
//! `local@domain.tld` with no whitespace. Password strength is left to the
//! provider, which reports its own policy violations.

use super::error::SignUpError;

/// A validated sign-up request.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    /// Validate raw form input. Name and email are trimmed; email is lower-cased.
    pub fn new(
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, SignUpError> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(SignUpError::MissingField);
        }
        if password != confirm_password {
            return Err(SignUpError::PasswordMismatch);
        }
        if !is_valid_email(&email) {
            return Err(SignUpError::InvalidEmail);
        }

        Ok(Self {
            name: name.to_string(),
            email,
            password: password.to_string(),
        })
    }
}

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain with
/// text on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

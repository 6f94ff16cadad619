//! # API crate: remote authentication for NutriTrack
//!
//! This crate is the client side of the account service the mobile, desktop,
//! and web frontends talk to. It knows how to reach the provider and how to
//! read its answers; it holds no local state.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | [`AuthClient`] trait, the Supabase implementation, provider configuration, sign-up form validation, error types |
//! | [`models`] | Provider payloads (`ProviderUser`, `ProviderSession`, `AuthPayload`) |
//!
//! ## Operations
//!
//! - **Sign-up**: `AuthClient::sign_up` with a validated [`SignUpRequest`]
//! - **Sign-in**: `AuthClient::sign_in` with email and password
//! - **Sign-out**: `AuthClient::sign_out` with the grant's access token

pub mod auth;
pub mod models;

pub use auth::{AuthClient, AuthError, SignUpError, SignUpRequest, SupabaseAuth, SupabaseConfig};
pub use models::{AuthPayload, ProviderSession, ProviderUser};

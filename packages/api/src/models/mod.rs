pub mod user;

pub use user::{AuthPayload, ProviderSession, ProviderUser};

mod login;
pub use login::Login;

mod signup;
pub use signup::Signup;

mod home;
pub use home::Home;

mod explore;
pub use explore::Explore;

mod profile;
pub use profile::Profile;

mod add_meal;
pub use add_meal::AddMeal;

mod not_found;
pub use not_found::NotFound;

use api::AuthError;
use ui::SessionError;

/// Message shown to the user for a failed account action.
pub(crate) fn describe(error: &SessionError) -> String {
    match error {
        SessionError::Provider(AuthError::InvalidCredentials) => {
            "Incorrect email or password".to_string()
        }
        SessionError::Provider(AuthError::DuplicateAccount) => {
            "An account with this email already exists".to_string()
        }
        SessionError::Provider(AuthError::Network(_)) => {
            "Could not reach the server. Check your connection".to_string()
        }
        SessionError::Busy => "Please wait for the current request to finish".to_string(),
        other => other.to_string(),
    }
}

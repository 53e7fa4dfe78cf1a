pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use session::SessionManager;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

lazy_static! {
    // Usernames are email-shaped; lowercase local and domain parts only.
    static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").unwrap();
}

/// Credentials submitted at registration and login.
///
/// The password is transient: it is verified or hashed and then dropped,
/// never persisted or logged in plaintext.
#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    /// Must be a valid email address.
    #[validate(custom = "validate_username")]
    pub username: String,
    /// Must satisfy the minimum-strength policy (see [`validate_password`]).
    #[validate(custom = "validate_password")]
    pub password: String,
}

/// Payload for rotating the authenticated user's password.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// The user's current password, re-verified before any change.
    pub current_password: String,
    /// The replacement password; held to the same strength policy as at registration.
    #[validate(custom = "validate_password")]
    pub new_password: String,
}

/// Checks that the username is present and email-shaped.
///
/// An empty username gets its own "required" message, distinct from the
/// malformed-address message.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("username is required".into());
        return Err(err);
    }

    if !EMAIL_REGEX.is_match(username) {
        let mut err = ValidationError::new("email");
        err.message = Some("invalid username. Use a valid email address".into());
        return Err(err);
    }

    Ok(())
}

/// Checks the minimum-strength policy: at least 8 characters, with at least
/// one digit, one uppercase letter, one lowercase letter, and one character
/// outside the alphanumeric set.
///
/// An empty password gets its own "required" message.
fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("password is required".into());
        return Err(err);
    }

    let strong = password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| !c.is_ascii_alphanumeric());

    if !strong {
        let mut err = ValidationError::new("weak_password");
        err.message = Some(
            "invalid password. Use at least 8 characters, combining uppercase letters, \
             lowercase letters, digits, and special characters"
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

//! Input validation for registration and user-authored text.

use std::str::FromStr;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{Result, SocialError};

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 80;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 120;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Requested username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password in clear text.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

impl Registration {
    /// Validate the form and return the normalized `(username, email)`.
    ///
    /// Uniqueness is not checked here; the store enforces it.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: password match, password length,
    /// username format, then email format.
    pub fn validate(&self) -> Result<(String, String)> {
        if self.password != self.confirm_password {
            return Err(SocialError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(SocialError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        let username = validate_username(&self.username)?;
        let email = validate_email(&self.email)?;
        Ok((username, email))
    }
}

/// Check a username and return it trimmed.
///
/// # Errors
///
/// Returns `InvalidUsername` if the length or character set is wrong.
pub fn validate_username(username: &str) -> Result<String> {
    let username = username.trim();
    let len = username.chars().count();

    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(SocialError::InvalidUsername(format!(
            "must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(SocialError::InvalidUsername(
            "only letters, digits, '_', '.' and '-' are allowed".into(),
        ));
    }

    Ok(username.to_string())
}

/// Check an email address and return it trimmed and lowercased.
///
/// # Errors
///
/// Returns `InvalidEmail` if the address is malformed or too long.
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(SocialError::InvalidEmail(format!(
            "must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }

    EmailAddress::from_str(&email).map_err(|e| SocialError::InvalidEmail(e.to_string()))?;
    Ok(email)
}

/// Trim user text and check it is non-empty and at most `max` characters.
///
/// # Errors
///
/// Returns `EmptyContent` or `ContentTooLong`.
pub fn validate_content(field: &'static str, content: &str, max: usize) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(SocialError::EmptyContent { field });
    }
    if content.chars().count() > max {
        return Err(SocialError::ContentTooLong { field, max });
    }
    Ok(content.to_string())
}

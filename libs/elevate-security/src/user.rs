use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefixes the proxy may put in front of an account e-mail.
const ACCOUNT_PREFIXES: &[&str] = &["accounts.google.com:", "user:"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("user id must not be empty")]
    Empty,

    #[error("'{0}' is not an e-mail address")]
    NotAnEmail(String),
}

/// Identity of an authenticated user.
///
/// `id` is the stable subject identifier issued by the proxy, `email` the
/// primary e-mail address that access policies refer to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId {
    id: String,
    email: String,
}

impl UserId {
    /// Create a user id from a subject identifier and an e-mail address.
    ///
    /// Known account prefixes (`accounts.google.com:`, `user:`) are stripped
    /// from the e-mail.
    #[must_use]
    pub fn new(id: impl Into<String>, email: &str) -> Self {
        Self {
            id: id.into(),
            email: strip_account_prefix(email).to_owned(),
        }
    }

    /// Create a user id for an e-mail address that doubles as subject id.
    ///
    /// # Errors
    ///
    /// Returns [`UserIdError`] if the value is blank or lacks an `@`.
    pub fn from_email(email: &str) -> Result<Self, UserIdError> {
        let email = strip_account_prefix(email.trim());
        if email.is_empty() {
            return Err(UserIdError::Empty);
        }
        if !email.contains('@') {
            return Err(UserIdError::NotAnEmail(email.to_owned()));
        }
        Ok(Self {
            id: email.to_owned(),
            email: email.to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Remove a known account prefix, if any.
#[must_use]
pub fn strip_account_prefix(value: &str) -> &str {
    ACCOUNT_PREFIXES
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value)
}

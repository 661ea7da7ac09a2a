//! Login input

use std::fmt;

use crate::error::{DomainError, DomainResult};

use super::types::Grant;

/// Minimum accepted username length.
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validated username/password pair for the password grant.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: String,
}

impl LoginCredentials {
    /// Validates and wraps a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns an error if either field is empty or shorter than allowed.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> DomainResult<Self> {
        let username = username.into();
        let password = password.into();

        let name_len = username.trim().chars().count();
        if name_len == 0 {
            return Err(DomainError::InvalidUsername(
                "username is required".to_string(),
            ));
        }
        if name_len < MIN_USERNAME_LEN {
            return Err(DomainError::InvalidUsername(format!(
                "username must be at least {MIN_USERNAME_LEN} characters"
            )));
        }

        let password_len = password.chars().count();
        if password_len == 0 {
            return Err(DomainError::InvalidPassword(
                "password is required".to_string(),
            ));
        }
        if password_len < MIN_PASSWORD_LEN {
            return Err(DomainError::InvalidPassword(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        Ok(Self {
            username: username.trim().to_string(),
            password,
        })
    }

    /// The account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Converts the pair into a password grant.
    #[must_use]
    pub fn into_grant(self) -> Grant {
        Grant::Password {
            username: self.username,
            password: self.password,
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

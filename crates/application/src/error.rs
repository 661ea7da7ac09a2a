//! Application error types

use invoicer_domain::{AuthError, DomainError};
use thiserror::Error;

use crate::ports::HttpClientError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The session layer rejected or failed the operation.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpClientError),

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// No usable session exists; the user has to log in.
    #[error("authentication required, please log in")]
    AuthenticationRequired,

    /// The server rejected the session and it was cleared.
    #[error("session expired, please log in again")]
    SessionExpired,
}

impl ApplicationError {
    /// Returns true if the user has to log in before retrying.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        match self {
            Self::AuthenticationRequired | Self::SessionExpired => true,
            Self::Auth(error) => error.requires_login(),
            Self::Domain(_) | Self::Http(_) | Self::Storage(_) => false,
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The login username does not satisfy the input rules.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// The login password does not satisfy the input rules.
    #[error("invalid password: {0}")]
    InvalidPassword(String),

    /// A search parameter is out of range.
    #[error("invalid search parameter: {0}")]
    InvalidSearchParam(String),

    /// An invoice payload has an invalid structure.
    #[error("invalid invoice payload: {0}")]
    InvalidInvoice(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

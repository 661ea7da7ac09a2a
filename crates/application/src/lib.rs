//! Invoicer Application - Session lifecycle and use cases
//!
//! This crate contains the application layer: the ports the session
//! depends on, the services that keep the credential set fresh, and the
//! invoice use cases built on top of them. It depends only on the domain
//! crate and defines traits (ports) that are implemented by the
//! infrastructure layer.

pub mod auth;
pub mod error;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

pub use auth::{
    AuthSession, CredentialStore, ExpiryEvaluator, ProfileOutcome, ProfileResolver,
    RefreshCoordinator, RequestAuthorizer, TokenAcquisition, TokenStatus,
};
pub use error::{ApplicationError, ApplicationResult};
pub use use_cases::{CreateInvoice, ListInvoices};

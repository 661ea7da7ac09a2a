//! Session management for the Invoicer client.
//!
//! This module provides:
//! - Durable credential storage and expiry checks
//! - Password and refresh token exchanges
//! - Organisation token resolution
//! - Single-flight refresh and request authorization

mod acquisition;
mod authorizer;
mod coordinator;
mod credential_store;
mod expiry;
mod profile;
mod session;
mod status;

pub use acquisition::TokenAcquisition;
pub use authorizer::RequestAuthorizer;
pub use coordinator::RefreshCoordinator;
pub use credential_store::CredentialStore;
pub use expiry::ExpiryEvaluator;
pub use profile::{ProfileOutcome, ProfileResolver};
pub use session::AuthSession;
pub use status::TokenStatus;

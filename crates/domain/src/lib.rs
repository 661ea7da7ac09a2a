//! Invoicer Domain - Core business types
//!
//! This crate defines the domain model for the Invoicer client: the
//! persisted credential set, token exchange types, membership and invoice
//! payloads. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod invoice;
pub mod membership;

pub use auth::{
    AuthError, AuthorizedRequest, CredentialKey, CredentialSet, CredentialUpdate, Grant,
    LoginCredentials, SAFETY_MARGIN_MS, TokenResponse, is_expired_at, token_preview,
};
pub use config::{ApiConfig, ClientCredentials, is_token_endpoint};
pub use error::{DomainError, DomainResult};
pub use invoice::{InvoicePage, InvoicePayload, Ordering, Paging, SearchParams};
pub use membership::{ApiError, Membership, OrgTokenLookup, UserData, UserProfile};

//! Authentication domain types

mod expiry;
mod login;
mod types;

pub use expiry::{SAFETY_MARGIN_MS, is_expired_at, remaining_ms};
pub use login::{LoginCredentials, MIN_PASSWORD_LEN, MIN_USERNAME_LEN};
pub use types::{
    AuthError, AuthorizedRequest, CredentialKey, CredentialSet, CredentialUpdate, Grant,
    OPENID_SCOPE, ORG_TOKEN_HEADER, TokenResponse, bearer, token_preview,
};

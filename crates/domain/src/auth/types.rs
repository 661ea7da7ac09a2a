//! Credential set and token exchange types

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientCredentials;

/// Scope requested by the password grant.
pub const OPENID_SCOPE: &str = "openid";

/// Storage keys of the persisted credential set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialKey {
    /// Bearer credential for API calls.
    AccessToken,
    /// Long-lived credential used to mint new access tokens.
    RefreshToken,
    /// Organisation selector sent as the `org-token` header.
    OrgToken,
    /// Absolute expiry of the access token, epoch millis as a string.
    TokenExpiry,
}

impl CredentialKey {
    /// Every key, in storage order.
    pub const ALL: [Self; 4] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::OrgToken,
        Self::TokenExpiry,
    ];

    /// Returns the name the value is stored under.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
            Self::OrgToken => "orgToken",
            Self::TokenExpiry => "tokenExpiry",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The credentials of one authenticated session.
///
/// Absent values are represented by empty strings and a zero expiry,
/// so a default `CredentialSet` means "not authenticated".
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSet {
    /// Bearer credential for API calls.
    pub access_token: String,
    /// Credential used to mint new access tokens.
    pub refresh_token: String,
    /// Active organisation context.
    pub org_token: String,
    /// Instant the access token becomes unusable, epoch millis.
    pub expires_at: i64,
}

impl CredentialSet {
    /// Returns true if an access token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Returns true if a refresh token is present.
    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Returns true if an organisation token is present.
    #[must_use]
    pub const fn has_org_token(&self) -> bool {
        !self.org_token.is_empty()
    }

    /// Returns true if nothing at all is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_empty()
            && self.refresh_token.is_empty()
            && self.org_token.is_empty()
            && self.expires_at == 0
    }

    /// Returns the `Authorization` header value for the access token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        bearer(&self.access_token)
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .field("org_token", &token_preview(&self.org_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Header carrying the organisation token.
pub const ORG_TOKEN_HEADER: &str = "org-token";

/// Credentials attached to one outbound request.
///
/// Built by the request authorizer and handed to the code that sends the
/// request, instead of mutating headers on a shared client.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizedRequest {
    access_token: String,
    org_token: String,
}

impl AuthorizedRequest {
    /// Creates the credentials for one request.
    #[must_use]
    pub fn new(access_token: impl Into<String>, org_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            org_token: org_token.into(),
        }
    }

    /// Credentials for a request that must go out without a session,
    /// such as a call to the token endpoint.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Returns true if no bearer token is attached.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.access_token.is_empty()
    }

    /// The bearer token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The organisation token, if one is known.
    #[must_use]
    pub fn org_token(&self) -> Option<&str> {
        Some(self.org_token.as_str()).filter(|t| !t.is_empty())
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        bearer(&self.access_token)
    }

    /// Header pairs to attach to the request.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(2);
        if !self.is_anonymous() {
            headers.push(("Authorization", self.authorization_header()));
        }
        if let Some(org) = self.org_token() {
            headers.push((ORG_TOKEN_HEADER, org.to_string()));
        }
        headers
    }
}

impl fmt::Debug for AuthorizedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedRequest")
            .field("access_token", &token_preview(&self.access_token))
            .field("org_token", &token_preview(&self.org_token))
            .finish()
    }
}

/// A partial write to the credential set.
///
/// Only `Some` fields with a non-empty value are written; the others are
/// left untouched in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialUpdate {
    /// New access token.
    pub access_token: Option<String>,
    /// New refresh token.
    pub refresh_token: Option<String>,
    /// New organisation token.
    pub org_token: Option<String>,
    /// New expiry, epoch millis.
    pub expires_at: Option<i64>,
}

impl CredentialUpdate {
    /// Builds the access/refresh/expiry update for one token exchange.
    ///
    /// The expiry is always derived from `acquired_at_ms`, the instant the
    /// response was received.
    #[must_use]
    pub fn from_token_response(response: &TokenResponse, acquired_at_ms: i64) -> Self {
        Self {
            access_token: Some(response.access_token.clone()),
            refresh_token: Some(response.refresh_token.clone()),
            org_token: None,
            expires_at: Some(response.expires_at(acquired_at_ms)),
        }
    }

    /// Builds an update that only replaces the organisation token.
    #[must_use]
    pub fn org_token(token: impl Into<String>) -> Self {
        Self {
            org_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Returns the `(key, value)` pairs this update writes.
    #[must_use]
    pub fn entries(&self) -> Vec<(CredentialKey, String)> {
        let mut entries = Vec::with_capacity(4);
        let strings = [
            (CredentialKey::AccessToken, &self.access_token),
            (CredentialKey::RefreshToken, &self.refresh_token),
            (CredentialKey::OrgToken, &self.org_token),
        ];
        for (key, value) in strings {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                entries.push((key, value.clone()));
            }
        }
        if let Some(expires_at) = self.expires_at.filter(|e| *e != 0) {
            entries.push((CredentialKey::TokenExpiry, expires_at.to_string()));
        }
        entries
    }

    /// Returns true if the update writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Successful response of the token endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Newly issued access token.
    pub access_token: String,
    /// Newly issued refresh token.
    #[serde(default)]
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    /// Granted scope.
    #[serde(default)]
    pub scope: Option<String>,
    /// Token type, usually `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Absolute expiry for a response received at `acquired_at_ms`.
    #[must_use]
    pub fn expires_at(&self, acquired_at_ms: i64) -> i64 {
        let lifetime_ms = i64::try_from(self.expires_in)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        acquired_at_ms.saturating_add(lifetime_ms)
    }

    /// Checks the fields the session depends on.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the access token is missing.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token.trim().is_empty() {
            return Err(AuthError::Validation {
                message: "token response has no access_token".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// An OAuth2 grant sent to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// Resource owner password grant.
    Password {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
    /// Refresh token grant.
    RefreshToken {
        /// The stored refresh token.
        refresh_token: String,
    },
}

impl Grant {
    /// The `grant_type` form value.
    #[must_use]
    pub const fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Form fields of the token request, client credentials included.
    #[must_use]
    pub fn form_params(&self, client: &ClientCredentials) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("client_id", client.client_id.clone()),
            ("client_secret", client.client_secret.clone()),
            ("grant_type", self.grant_type().to_string()),
        ];
        match self {
            Self::Password { username, password } => {
                params.push(("scope", OPENID_SCOPE.to_string()));
                params.push(("username", username.clone()));
                params.push(("password", password.clone()));
            }
            Self::RefreshToken { refresh_token } => {
                params.push(("refresh_token", refresh_token.clone()));
            }
        }
        params
    }
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::RefreshToken { refresh_token } => f
                .debug_struct("RefreshToken")
                .field("refresh_token", &token_preview(refresh_token))
                .finish(),
        }
    }
}

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Network failure or non-2xx answer from the token or membership endpoint.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Error description.
        message: String,
    },

    /// The response body was malformed or missed expected fields.
    #[error("invalid response: {message}")]
    Validation {
        /// Error description.
        message: String,
    },

    /// The server rejected the credential set.
    #[error("authorization rejected by the server")]
    AuthorizationRejected,

    /// No refresh token is stored.
    #[error("no refresh token available")]
    RefreshUnavailable,

    /// The refresh exchange failed and the session was cleared.
    #[error("token refresh failed")]
    RefreshFailed,

    /// The refresh this request was waiting on failed.
    #[error("token refresh abandoned by the initiating request")]
    RefreshAbandoned,

    /// Waiting on the in-flight refresh took too long.
    #[error("timed out after {waited_ms} ms waiting for token refresh")]
    RefreshTimedOut {
        /// How long the request waited.
        waited_ms: u64,
    },
}

impl AuthError {
    /// Returns true if the session is gone and the user must log in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationRejected
                | Self::RefreshUnavailable
                | Self::RefreshFailed
                | Self::RefreshAbandoned
        )
    }
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" (HTTP {s})"))
}

/// Formats a bearer `Authorization` header value.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Get a preview of a token (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.len() > 12 {
        let cut = token
            .char_indices()
            .nth(8)
            .map_or(token.len(), |(index, _)| index);
        format!("{}...", &token[..cut])
    } else {
        token.to_string()
    }
}

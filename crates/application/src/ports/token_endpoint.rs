//! OAuth2 token endpoint port

use async_trait::async_trait;
use invoicer_domain::{AuthError, Grant, TokenResponse};

/// Port for the OAuth2 token endpoint.
///
/// Implementations add the configured client credentials to every grant.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Exchanges a grant for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Transport` for network failures and non-2xx
    /// answers, `AuthError::Validation` for malformed bodies.
    async fn exchange(&self, grant: &Grant) -> Result<TokenResponse, AuthError>;
}

//! API endpoint and client configuration

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{DomainError, DomainResult};

/// Path of the OAuth2 token endpoint, relative to the base URL.
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Path of the current-user membership endpoint, relative to the API URL.
pub const MEMBERSHIP_PATH: &str = "/membership-service/1.0.0/users/me";

/// Path of the invoice collection, relative to the API URL.
pub const INVOICES_PATH: &str = "/invoice-service/1.0.0/invoices";

/// Default bound on how long a request waits for another request's refresh.
pub const DEFAULT_REFRESH_WAIT: Duration = Duration::from_secs(30);

/// OAuth client credentials, shared by the password and refresh grants.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

impl ClientCredentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Resolved endpoints and client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    token_url: Url,
    membership_url: Url,
    invoices_url: Url,
    client: ClientCredentials,
    refresh_wait: Duration,
}

impl ApiConfig {
    /// Builds the configuration from the two service roots.
    ///
    /// `base_url` hosts the token endpoint, `api_url` the membership and
    /// invoice services.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if either root is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, api_url: &str, client: ClientCredentials) -> DomainResult<Self> {
        Ok(Self {
            token_url: endpoint(base_url, TOKEN_PATH)?,
            membership_url: endpoint(api_url, MEMBERSHIP_PATH)?,
            invoices_url: endpoint(api_url, INVOICES_PATH)?,
            client,
            refresh_wait: DEFAULT_REFRESH_WAIT,
        })
    }

    /// Overrides the refresh wait bound.
    #[must_use]
    pub const fn with_refresh_wait(mut self, refresh_wait: Duration) -> Self {
        self.refresh_wait = refresh_wait;
        self
    }

    /// The OAuth2 token endpoint.
    #[must_use]
    pub const fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// The current-user membership endpoint.
    #[must_use]
    pub const fn membership_url(&self) -> &Url {
        &self.membership_url
    }

    /// The invoice collection endpoint.
    #[must_use]
    pub const fn invoices_url(&self) -> &Url {
        &self.invoices_url
    }

    /// The OAuth client credentials.
    #[must_use]
    pub const fn client(&self) -> &ClientCredentials {
        &self.client
    }

    /// How long a request waits on another request's refresh.
    #[must_use]
    pub const fn refresh_wait(&self) -> Duration {
        self.refresh_wait
    }
}

/// Returns true if `url` addresses the token endpoint.
///
/// Requests to the token endpoint bypass the authorization gate.
#[must_use]
pub fn is_token_endpoint(url: &str) -> bool {
    url.contains(TOKEN_PATH.trim_start_matches('/'))
}

fn endpoint(root: &str, path: &str) -> DomainResult<Url> {
    let root = root.trim();
    if !root.starts_with("http://") && !root.starts_with("https://") {
        return Err(DomainError::InvalidUrl(format!(
            "URL must start with http:// or https://: {root}"
        )));
    }
    let joined = format!("{}{path}", root.trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {joined}")))
}

//! Pre-send and post-receive hooks for authorized requests.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use invoicer_domain::{AuthError, AuthorizedRequest, is_token_endpoint};
use tracing::{debug, warn};

use super::{CredentialStore, ExpiryEvaluator, RefreshCoordinator, TokenAcquisition};
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::HttpClientError;

const UNAUTHORIZED: u16 = 401;

/// Attaches session credentials to outbound requests.
#[derive(Clone)]
pub struct RequestAuthorizer {
    store: CredentialStore,
    expiry: ExpiryEvaluator,
    coordinator: Arc<RefreshCoordinator>,
    acquisition: TokenAcquisition,
}

impl RequestAuthorizer {
    /// Creates an authorizer sharing `coordinator` with the rest of the session.
    #[must_use]
    pub fn new(
        store: CredentialStore,
        expiry: ExpiryEvaluator,
        coordinator: Arc<RefreshCoordinator>,
        acquisition: TokenAcquisition,
    ) -> Self {
        Self {
            store,
            expiry,
            coordinator,
            acquisition,
        }
    }

    /// Returns the credentials to attach to a request for `url`.
    ///
    /// Token endpoint requests get anonymous credentials. Otherwise an
    /// expired access token is refreshed first, sharing any refresh that is
    /// already in flight.
    ///
    /// # Errors
    ///
    /// Returns the coordinator's error if the token had to be refreshed and
    /// the refresh did not produce one.
    pub async fn authorize(&self, url: &str) -> Result<AuthorizedRequest, AuthError> {
        if is_token_endpoint(url) {
            return Ok(AuthorizedRequest::anonymous());
        }

        let credentials = self.store.get().await;
        if !self.expiry.is_expired_set(&credentials) {
            debug!(url, "access token valid");
            return Ok(AuthorizedRequest::new(
                credentials.access_token,
                credentials.org_token,
            ));
        }

        debug!(url, "access token expired, refreshing");
        let access_token = self
            .coordinator
            .refresh_with(|| async move {
                // Another leader may have finished between our read and now.
                let current = self.store.get().await;
                if !self.expiry.is_expired_set(&current) {
                    return Ok(current.access_token);
                }
                self.acquisition.refresh_session().await
            })
            .await?;
        let org_token = self.store.get().await.org_token;
        Ok(AuthorizedRequest::new(access_token, org_token))
    }

    /// Inspects a response status; a 401 clears the whole session.
    ///
    /// Returns true if the session was cleared.
    pub async fn observe(&self, status: u16) -> bool {
        if status != UNAUTHORIZED {
            return false;
        }
        warn!(status, "server rejected credentials, clearing session");
        self.store.clear().await;
        true
    }

    /// Authorizes a request for `url`, runs `op` with the credentials and
    /// observes its failure status.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::Auth` if authorization failed before sending
    /// - `ApplicationError::SessionExpired` if the server answered 401
    /// - `ApplicationError::Http` for other failures of `op`
    pub async fn send<T, F, Fut>(&self, url: &str, op: F) -> ApplicationResult<T>
    where
        F: FnOnce(AuthorizedRequest) -> Fut,
        Fut: Future<Output = Result<T, HttpClientError>>,
    {
        let auth = self.authorize(url).await?;
        match op(auth).await {
            Ok(value) => Ok(value),
            Err(e) => {
                if let Some(status) = e.status()
                    && self.observe(status).await
                {
                    return Err(ApplicationError::SessionExpired);
                }
                Err(e.into())
            }
        }
    }
}

impl fmt::Debug for RequestAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuthorizer")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

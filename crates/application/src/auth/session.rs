//! The authenticated session as one handle.

use std::sync::Arc;
use std::time::Duration;

use invoicer_domain::{CredentialSet, LoginCredentials};
use tracing::info;

use super::{
    CredentialStore, ExpiryEvaluator, ProfileResolver, RefreshCoordinator, RequestAuthorizer,
    TokenAcquisition, TokenStatus,
};
use crate::error::ApplicationResult;
use crate::ports::{Clock, KeyValueStore, MembershipApi, TokenEndpoint};

/// Owns the session services and the refresh coordinator they share.
#[derive(Debug, Clone)]
pub struct AuthSession {
    store: CredentialStore,
    expiry: ExpiryEvaluator,
    acquisition: TokenAcquisition,
    coordinator: Arc<RefreshCoordinator>,
    authorizer: RequestAuthorizer,
}

impl AuthSession {
    /// Wires the session services on top of the given ports.
    ///
    /// `refresh_wait` bounds how long a request waits on a refresh started
    /// by another request.
    #[must_use]
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        tokens: Arc<dyn TokenEndpoint>,
        membership: Arc<dyn MembershipApi>,
        clock: Arc<dyn Clock>,
        refresh_wait: Duration,
    ) -> Self {
        let store = CredentialStore::new(storage);
        let expiry = ExpiryEvaluator::new(store.clone(), Arc::clone(&clock));
        let profile = ProfileResolver::new(membership, store.clone());
        let acquisition = TokenAcquisition::new(tokens, store.clone(), profile, clock);
        let coordinator = Arc::new(RefreshCoordinator::new(refresh_wait));
        let authorizer = RequestAuthorizer::new(
            store.clone(),
            expiry.clone(),
            Arc::clone(&coordinator),
            acquisition.clone(),
        );

        Self {
            store,
            expiry,
            acquisition,
            coordinator,
            authorizer,
        }
    }

    /// Validates the input and logs in with the password grant.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::Domain` if the username or password is too short
    /// - `ApplicationError::Auth` if the token exchange failed
    pub async fn login(&self, username: &str, password: &str) -> ApplicationResult<TokenStatus> {
        let credentials = LoginCredentials::new(username, password)?;
        self.acquisition.login(credentials).await?;
        Ok(self.status().await)
    }

    /// Forgets the stored session.
    pub async fn logout(&self) {
        self.store.clear().await;
        info!("logged out");
    }

    /// Refreshes the access token now, sharing any refresh already running.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Auth` if no new token was obtained.
    pub async fn refresh(&self) -> ApplicationResult<TokenStatus> {
        let acquisition = &self.acquisition;
        self.coordinator
            .refresh_with(|| acquisition.refresh_session())
            .await?;
        Ok(self.status().await)
    }

    /// Describes the stored session.
    pub async fn status(&self) -> TokenStatus {
        let credentials = self.store.get().await;
        if !credentials.is_authenticated() {
            return TokenStatus::NotAuthenticated;
        }
        if self.expiry.is_expired_set(&credentials) {
            return TokenStatus::Expired {
                can_refresh: credentials.can_refresh(),
            };
        }
        TokenStatus::Valid {
            seconds_remaining: self.expiry.remaining_ms(&credentials) / 1000,
            has_organisation: credentials.has_org_token(),
        }
    }

    /// The stored credential set.
    pub async fn credentials(&self) -> CredentialSet {
        self.store.get().await
    }

    /// The authorizer for outbound API requests.
    #[must_use]
    pub const fn authorizer(&self) -> &RequestAuthorizer {
        &self.authorizer
    }

    /// The underlying credential store.
    #[must_use]
    pub const fn store(&self) -> &CredentialStore {
        &self.store
    }
}

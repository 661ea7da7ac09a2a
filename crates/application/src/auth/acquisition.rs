//! Password and refresh token exchanges.

use std::fmt;
use std::sync::Arc;

use invoicer_domain::{
    AuthError, CredentialUpdate, Grant, LoginCredentials, TokenResponse, token_preview,
};
use tracing::{debug, info, warn};

use super::{CredentialStore, ProfileResolver};
use crate::ports::{Clock, TokenEndpoint};

/// Performs token exchanges and commits their results.
#[derive(Clone)]
pub struct TokenAcquisition {
    endpoint: Arc<dyn TokenEndpoint>,
    store: CredentialStore,
    profile: ProfileResolver,
    clock: Arc<dyn Clock>,
}

impl TokenAcquisition {
    /// Creates the acquisition service.
    #[must_use]
    pub fn new(
        endpoint: Arc<dyn TokenEndpoint>,
        store: CredentialStore,
        profile: ProfileResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            endpoint,
            store,
            profile,
            clock,
        }
    }

    /// Logs in with the password grant.
    ///
    /// On success the token pair and its expiry are stored in one batch,
    /// then the organisation token is resolved with the new access token.
    ///
    /// # Errors
    ///
    /// Returns the endpoint's error unchanged; storage is not touched.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<TokenResponse, AuthError> {
        let username = credentials.username().to_string();
        let response = self.exchange(&credentials.into_grant()).await?;
        let acquired_at = self.clock.now_millis();

        self.store
            .set(&CredentialUpdate::from_token_response(&response, acquired_at))
            .await;
        info!(
            username = %username,
            access_token = %token_preview(&response.access_token),
            expires_in = response.expires_in,
            "logged in"
        );

        self.profile.resolve_organisation(&response.access_token).await;
        Ok(response)
    }

    /// Refreshes the session and returns the new access token.
    ///
    /// Without a stored refresh token no exchange is attempted. A failed
    /// exchange clears the whole credential set.
    ///
    /// # Errors
    ///
    /// `AuthError::RefreshUnavailable` without a refresh token, otherwise
    /// the endpoint's error.
    pub async fn refresh_session(&self) -> Result<String, AuthError> {
        let refresh_token = self.store.get().await.refresh_token;
        if refresh_token.is_empty() {
            debug!("no refresh token stored, skipping refresh");
            return Err(AuthError::RefreshUnavailable);
        }

        let response = match self.exchange(&Grant::RefreshToken { refresh_token }).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing session");
                self.store.clear().await;
                return Err(e);
            }
        };
        let acquired_at = self.clock.now_millis();

        self.profile.resolve_organisation(&response.access_token).await;
        self.store
            .set(&CredentialUpdate::from_token_response(&response, acquired_at))
            .await;
        info!(
            access_token = %token_preview(&response.access_token),
            expires_in = response.expires_in,
            "token refreshed"
        );

        Ok(response.access_token)
    }

    /// Refreshes the session, reporting only whether it worked.
    pub async fn refresh(&self) -> bool {
        self.refresh_session().await.is_ok()
    }

    async fn exchange(&self, grant: &Grant) -> Result<TokenResponse, AuthError> {
        debug!(grant_type = grant.grant_type(), "exchanging grant");
        let response = self.endpoint.exchange(grant).await?;
        response.validate()?;
        Ok(response)
    }
}

impl fmt::Debug for TokenAcquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAcquisition")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ports::{KeyValueStore, MembershipApi};
    use crate::testing::{
        ManualClock, MemoryKv, ScriptedMembership, ScriptedTokens, token_response,
    };
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_700_000_000_000;

    struct Fixture {
        acquisition: TokenAcquisition,
        kv: Arc<MemoryKv>,
        tokens: Arc<ScriptedTokens>,
        membership: Arc<ScriptedMembership>,
    }

    fn fixture(kv: MemoryKv, tokens: ScriptedTokens, membership: ScriptedMembership) -> Fixture {
        let kv = Arc::new(kv);
        let tokens = Arc::new(tokens);
        let membership = Arc::new(membership);
        let store = CredentialStore::new(Arc::clone(&kv) as Arc<dyn KeyValueStore>);
        let profile = ProfileResolver::new(
            Arc::clone(&membership) as Arc<dyn MembershipApi>,
            store.clone(),
        );
        let acquisition = TokenAcquisition::new(
            Arc::clone(&tokens) as Arc<dyn TokenEndpoint>,
            store,
            profile,
            Arc::new(ManualClock::at(NOW)),
        );
        Fixture {
            acquisition,
            kv,
            tokens,
            membership,
        }
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials::new("alice", "secret1").unwrap()
    }

    #[tokio::test]
    async fn test_login_stores_tokens_expiry_and_org() {
        let f = fixture(
            MemoryKv::default(),
            ScriptedTokens::replying(vec![Ok(token_response("X", "Y", 3600))]),
            ScriptedMembership::org("ORG1"),
        );

        let response = f.acquisition.login(credentials()).await.unwrap();

        assert_eq!(response.access_token, "X");
        assert_eq!(f.kv.value("accessToken").as_deref(), Some("X"));
        assert_eq!(f.kv.value("refreshToken").as_deref(), Some("Y"));
        assert_eq!(f.kv.value("orgToken").as_deref(), Some("ORG1"));
        assert_eq!(
            f.kv.value("tokenExpiry"),
            Some((NOW + 3_600_000).to_string())
        );
        assert_eq!(f.membership.seen_tokens(), vec!["X".to_string()]);
        assert!(matches!(
            f.tokens.grants().as_slice(),
            [Grant::Password { username, .. }] if username == "alice"
        ));
    }

    #[tokio::test]
    async fn test_login_with_empty_memberships_keeps_org_token() {
        let f = fixture(
            MemoryKv::with(&[("orgToken", "PREVIOUS")]),
            ScriptedTokens::replying(vec![Ok(token_response("X", "Y", 3600))]),
            ScriptedMembership::no_memberships(),
        );

        f.acquisition.login(credentials()).await.unwrap();

        assert_eq!(f.kv.value("accessToken").as_deref(), Some("X"));
        assert_eq!(f.kv.value("orgToken").as_deref(), Some("PREVIOUS"));
    }

    #[tokio::test]
    async fn test_login_failure_propagates_and_leaves_store() {
        let rejected = AuthError::Transport {
            status: Some(400),
            message: "invalid_grant".to_string(),
        };
        let f = fixture(
            MemoryKv::with(&[("accessToken", "OLD")]),
            ScriptedTokens::replying(vec![Err(rejected.clone())]),
            ScriptedMembership::org("ORG1"),
        );

        let err = f.acquisition.login(credentials()).await.unwrap_err();

        assert_eq!(err, rejected);
        assert_eq!(f.kv.value("accessToken").as_deref(), Some("OLD"));
        assert!(f.membership.seen_tokens().is_empty());
    }

    #[tokio::test]
    async fn test_login_rejects_response_without_access_token() {
        let f = fixture(
            MemoryKv::default(),
            ScriptedTokens::replying(vec![Ok(token_response("", "Y", 3600))]),
            ScriptedMembership::org("ORG1"),
        );

        let err = f.acquisition.login(credentials()).await.unwrap_err();

        assert!(matches!(err, AuthError::Validation { .. }));
        assert_eq!(f.kv.len(), 0);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_makes_no_call() {
        let f = fixture(
            MemoryKv::with(&[("accessToken", "A")]),
            ScriptedTokens::default(),
            ScriptedMembership::org("ORG1"),
        );

        assert!(!f.acquisition.refresh().await);
        assert_eq!(f.tokens.calls(), 0);
        assert_eq!(f.kv.value("accessToken").as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_refresh_success_uses_new_token_for_profile() {
        let f = fixture(
            MemoryKv::with(&[
                ("accessToken", "OLD"),
                ("refreshToken", "R1"),
                ("tokenExpiry", "1"),
            ]),
            ScriptedTokens::replying(vec![Ok(token_response("NEW", "R2", 600))]),
            ScriptedMembership::org("ORG2"),
        );

        let token = f.acquisition.refresh_session().await.unwrap();

        assert_eq!(token, "NEW");
        assert_eq!(f.membership.seen_tokens(), vec!["NEW".to_string()]);
        assert_eq!(f.kv.value("refreshToken").as_deref(), Some("R2"));
        assert_eq!(f.kv.value("orgToken").as_deref(), Some("ORG2"));
        assert_eq!(f.kv.value("tokenExpiry"), Some((NOW + 600_000).to_string()));
        assert!(matches!(
            f.tokens.grants().as_slice(),
            [Grant::RefreshToken { refresh_token }] if refresh_token == "R1"
        ));
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_everything() {
        let f = fixture(
            MemoryKv::with(&[
                ("accessToken", "A"),
                ("refreshToken", "R"),
                ("orgToken", "O"),
                ("tokenExpiry", "1"),
            ]),
            ScriptedTokens::replying(vec![Err(AuthError::Transport {
                status: Some(400),
                message: "invalid_grant".to_string(),
            })]),
            ScriptedMembership::org("ORG1"),
        );

        assert!(!f.acquisition.refresh().await);
        assert_eq!(f.kv.len(), 0);
        assert!(f.membership.seen_tokens().is_empty());
    }
}

//! Organisation token resolution from the membership service.

use std::fmt;
use std::sync::Arc;

use invoicer_domain::{ApiError, CredentialUpdate, OrgTokenLookup, UserProfile, token_preview};
use tracing::{info, warn};

use super::CredentialStore;
use crate::ports::MembershipApi;

/// Outcome of one profile lookup.
///
/// Lookups never fail the caller; every problem is reported as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// The organisation token was found and stored.
    Updated(String),
    /// The user has no memberships; the stored token is unchanged.
    NoMemberships,
    /// The first membership has no token; the stored token is unchanged.
    MissingToken,
    /// The lookup itself failed.
    Failed(ApiError),
}

impl ProfileOutcome {
    /// Returns true if a new organisation token was stored.
    #[must_use]
    pub const fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// Keeps the stored organisation token in line with the user's profile.
#[derive(Clone)]
pub struct ProfileResolver {
    api: Arc<dyn MembershipApi>,
    store: CredentialStore,
}

impl ProfileResolver {
    /// Creates a resolver writing to `store`.
    #[must_use]
    pub fn new(api: Arc<dyn MembershipApi>, store: CredentialStore) -> Self {
        Self { api, store }
    }

    /// Fetches the profile with `access_token` and stores the first
    /// membership's organisation token.
    ///
    /// The token is passed explicitly so a freshly issued token can be used
    /// before it has been committed to storage.
    pub async fn resolve_organisation(&self, access_token: &str) -> ProfileOutcome {
        let fetched = self.api.current_user(access_token).await;
        let data = match fetched.and_then(UserProfile::into_data) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, status = ?e.status, "failed to fetch user profile");
                return ProfileOutcome::Failed(e);
            }
        };

        match data.first_org_token() {
            OrgTokenLookup::Found(token) => {
                self.store.set(&CredentialUpdate::org_token(token.clone())).await;
                info!(org_token = %token_preview(&token), "organisation token updated");
                ProfileOutcome::Updated(token)
            }
            OrgTokenLookup::NoMemberships => {
                warn!("user has no organisation memberships");
                ProfileOutcome::NoMemberships
            }
            OrgTokenLookup::MissingToken => {
                warn!("first membership carries no organisation token");
                ProfileOutcome::MissingToken
            }
        }
    }
}

impl fmt::Debug for ProfileResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileResolver")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

//! Clock-driven expiry checks.

use std::fmt;
use std::sync::Arc;

use invoicer_domain::auth::remaining_ms;
use invoicer_domain::{CredentialSet, is_expired_at};

use super::CredentialStore;
use crate::ports::Clock;

/// Decides whether the stored access token is still usable.
#[derive(Clone)]
pub struct ExpiryEvaluator {
    store: CredentialStore,
    clock: Arc<dyn Clock>,
}

impl ExpiryEvaluator {
    /// Creates an evaluator reading from `store` and `clock`.
    #[must_use]
    pub fn new(store: CredentialStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns true if the stored access token is expired or about to be.
    pub async fn is_expired(&self) -> bool {
        let credentials = self.store.get().await;
        self.is_expired_set(&credentials)
    }

    /// Same check against an already loaded credential set.
    #[must_use]
    pub fn is_expired_set(&self, credentials: &CredentialSet) -> bool {
        is_expired_at(credentials.expires_at, self.clock.now_millis())
    }

    /// Milliseconds the token remains usable, zero once expired.
    #[must_use]
    pub fn remaining_ms(&self, credentials: &CredentialSet) -> i64 {
        remaining_ms(credentials.expires_at, self.clock.now_millis())
    }

    /// Current time from the injected clock, epoch millis.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}

impl fmt::Debug for ExpiryEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryEvaluator").finish_non_exhaustive()
    }
}

//! Membership service port

use async_trait::async_trait;
use invoicer_domain::{ApiError, UserProfile};

/// Port for the membership service.
#[async_trait]
pub trait MembershipApi: Send + Sync {
    /// Fetches the profile of the user owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns a structured `ApiError` on transport failures, non-2xx
    /// answers and undecodable bodies.
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, ApiError>;
}

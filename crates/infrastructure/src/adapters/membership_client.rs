//! Membership service client.

use async_trait::async_trait;
use invoicer_application::ports::MembershipApi;
use invoicer_domain::auth::bearer;
use invoicer_domain::{ApiConfig, ApiError, UserProfile};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use url::Url;

const PROFILE_FETCH_FAILED: &str = "Failed to fetch user profile";

/// Fetches the current user's profile with reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestMembershipApi {
    client: Client,
    membership_url: Url,
}

impl ReqwestMembershipApi {
    /// Creates a client for `membership_url`.
    #[must_use]
    pub const fn new(client: Client, membership_url: Url) -> Self {
        Self {
            client,
            membership_url,
        }
    }

    /// Creates a client from the resolved configuration.
    #[must_use]
    pub fn from_config(client: Client, config: &ApiConfig) -> Self {
        Self::new(client, config.membership_url().clone())
    }
}

#[async_trait]
impl MembershipApi for ReqwestMembershipApi {
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let response = self
            .client
            .get(self.membership_url.clone())
            .header(AUTHORIZATION, bearer(access_token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::new(format!("{PROFILE_FETCH_FAILED}: {e}")))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError {
            status: Some(status.as_u16()),
            ..ApiError::new(format!("{PROFILE_FETCH_FAILED}: {e}"))
        })?;

        if !status.is_success() {
            return Err(ApiError::from_response(
                status.as_u16(),
                &text,
                PROFILE_FETCH_FAILED,
            ));
        }

        serde_json::from_str(&text).map_err(|_| ApiError {
            status: Some(status.as_u16()),
            ..ApiError::new("Invalid response format")
        })
    }
}

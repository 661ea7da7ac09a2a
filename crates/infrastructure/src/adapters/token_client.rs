//! OAuth2 token endpoint client.

use async_trait::async_trait;
use invoicer_application::ports::TokenEndpoint;
use invoicer_domain::{ApiConfig, AuthError, ClientCredentials, Grant, TokenResponse};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use super::http::error_message;

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Token endpoint adapter posting form-encoded grants with reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTokenEndpoint {
    client: Client,
    token_url: Url,
    credentials: ClientCredentials,
}

impl ReqwestTokenEndpoint {
    /// Creates a client for `token_url` authenticating as `credentials`.
    #[must_use]
    pub const fn new(client: Client, token_url: Url, credentials: ClientCredentials) -> Self {
        Self {
            client,
            token_url,
            credentials,
        }
    }

    /// Creates a client from the resolved configuration.
    #[must_use]
    pub fn from_config(client: Client, config: &ApiConfig) -> Self {
        Self::new(client, config.token_url().clone(), config.client().clone())
    }
}

#[async_trait]
impl TokenEndpoint for ReqwestTokenEndpoint {
    async fn exchange(&self, grant: &Grant) -> Result<TokenResponse, AuthError> {
        let body = serde_urlencoded::to_string(grant.form_params(&self.credentials)).map_err(
            |e| AuthError::Validation {
                message: format!("failed to encode form: {e}"),
            },
        )?;

        let response = self
            .client
            .post(self.token_url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| AuthError::Transport {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AuthError::Transport {
            status: Some(status.as_u16()),
            message: format!("failed to read token response: {e}"),
        })?;
        debug!(
            status = status.as_u16(),
            grant_type = grant.grant_type(),
            "token endpoint answered"
        );

        if !status.is_success() {
            return Err(AuthError::Transport {
                status: Some(status.as_u16()),
                message: error_message(&text, status),
            });
        }

        serde_json::from_str(&text).map_err(|e| AuthError::Validation {
            message: format!("failed to parse token response: {e}"),
        })
    }
}

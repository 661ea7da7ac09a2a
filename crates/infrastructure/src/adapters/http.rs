//! Shared reqwest setup for the service adapters.

use std::time::Duration;

use invoicer_application::ports::HttpClientError;
use reqwest::Client;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("Invoicer/", env!("CARGO_PKG_VERSION"));

/// Request timeout used by [`build_client`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client shared by all adapters.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client, HttpClientError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| HttpClientError::ConnectionFailed(e.to_string()))
}

/// Maps reqwest errors to `HttpClientError`.
pub(crate) fn map_error(error: &reqwest::Error) -> HttpClientError {
    if error.is_timeout() {
        return HttpClientError::ConnectionFailed(format!("request timed out: {error}"));
    }
    if error.is_decode() {
        return HttpClientError::InvalidBody(error.to_string());
    }
    HttpClientError::ConnectionFailed(error.to_string())
}

/// Picks a readable message out of an error body.
///
/// Looks for the usual `message`, `error_description` and `error` fields
/// and falls back to the HTTP reason phrase.
pub(crate) fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return if body.trim().is_empty() {
            fallback()
        } else {
            body.trim().to_string()
        };
    };
    ["message", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map_or_else(fallback, ToString::to_string)
}

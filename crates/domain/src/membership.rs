//! Membership service payloads

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of `GET /membership-service/1.0.0/users/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Profile data; absent in malformed responses.
    #[serde(default)]
    pub data: Option<UserData>,
}

/// The authenticated user's profile data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Organisations the user belongs to.
    #[serde(default)]
    pub memberships: Option<Vec<Membership>>,
}

/// Membership of one organisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Token selecting this organisation.
    #[serde(default)]
    pub token: Option<String>,
    /// Organisation identifier.
    #[serde(default)]
    pub organisation_id: Option<String>,
}

/// Result of looking up the active organisation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgTokenLookup {
    /// The first membership carries a token.
    Found(String),
    /// The user has no memberships.
    NoMemberships,
    /// The first membership has no token.
    MissingToken,
}

impl UserData {
    /// Memberships as a slice, empty when absent.
    #[must_use]
    pub fn memberships(&self) -> &[Membership] {
        self.memberships.as_deref().unwrap_or_default()
    }

    /// Extracts the token of the first membership.
    #[must_use]
    pub fn first_org_token(&self) -> OrgTokenLookup {
        match self.memberships().first() {
            None => OrgTokenLookup::NoMemberships,
            Some(membership) => membership
                .token
                .as_ref()
                .filter(|t| !t.is_empty())
                .map_or(OrgTokenLookup::MissingToken, |t| {
                    OrgTokenLookup::Found(t.clone())
                }),
        }
    }
}

impl UserProfile {
    /// Returns the profile data or a structured error for malformed bodies.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` if the `data` object is missing.
    pub fn into_data(self) -> Result<UserData, ApiError> {
        self.data
            .ok_or_else(|| ApiError::new("Invalid response format"))
    }
}

/// Structured, non-throwing error of an API call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    /// Human readable description.
    pub message: String,
    /// Service specific error code.
    #[serde(default)]
    pub code: Option<String>,
    /// HTTP status, if a response was received.
    #[serde(default)]
    pub status: Option<u16>,
}

impl ApiError {
    /// Creates an error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: None,
        }
    }

    /// Builds an error from a non-2xx response.
    ///
    /// The body's `message` and `code` fields are used when present.
    #[must_use]
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
            code: Option<String>,
        }

        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| fallback.to_string());
        Self {
            message,
            code: parsed.and_then(|b| b.code),
            status: Some(status),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_profile() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"data":{"memberships":[{"token":"ORG1","organisationId":"o-1"},{"token":"ORG2"}]}}"#,
        )
        .unwrap();
        let data = profile.into_data().unwrap();
        assert_eq!(data.memberships().len(), 2);
        assert_eq!(data.memberships()[0].organisation_id.as_deref(), Some("o-1"));
        assert_eq!(data.first_org_token(), OrgTokenLookup::Found("ORG1".to_string()));
    }

    #[test]
    fn test_empty_memberships() {
        let data = UserData {
            memberships: Some(vec![]),
        };
        assert_eq!(data.first_org_token(), OrgTokenLookup::NoMemberships);
        assert_eq!(UserData::default().first_org_token(), OrgTokenLookup::NoMemberships);
    }

    #[test]
    fn test_membership_without_token() {
        let data = UserData {
            memberships: Some(vec![Membership {
                token: None,
                organisation_id: Some("o-1".to_string()),
            }]),
        };
        assert_eq!(data.first_org_token(), OrgTokenLookup::MissingToken);
    }

    #[test]
    fn test_missing_data_is_error() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(
            profile.into_data().unwrap_err().message,
            "Invalid response format"
        );
    }

    #[test]
    fn test_error_from_response_body() {
        let err = ApiError::from_response(403, r#"{"message":"forbidden","code":"E403"}"#, "fallback");
        assert_eq!(err.message, "forbidden");
        assert_eq!(err.code.as_deref(), Some("E403"));
        assert_eq!(err.status, Some(403));

        let err = ApiError::from_response(500, "oops", "Failed to fetch user profile");
        assert_eq!(err.message, "Failed to fetch user profile");
        assert_eq!(err.code, None);
    }
}

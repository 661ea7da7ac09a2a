//! Session status for display.

/// Status of the stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// No access token is stored.
    NotAuthenticated,
    /// The access token is usable.
    Valid {
        /// Seconds the token remains usable.
        seconds_remaining: i64,
        /// Whether an organisation token is stored.
        has_organisation: bool,
    },
    /// The access token is within the safety margin or past expiry.
    Expired {
        /// Whether a refresh token is stored.
        can_refresh: bool,
    },
}

impl TokenStatus {
    /// Returns true if requests can be sent without refreshing first.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Returns true if some session, usable or not, is stored.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::NotAuthenticated)
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not authenticated".to_string(),
            Self::Valid {
                seconds_remaining,
                has_organisation,
            } => {
                let validity = if *seconds_remaining > 3600 {
                    format!("Valid for {} hours", seconds_remaining / 3600)
                } else if *seconds_remaining > 60 {
                    format!("Valid for {} minutes", seconds_remaining / 60)
                } else {
                    format!("Valid for {seconds_remaining} seconds")
                };
                if *has_organisation {
                    validity
                } else {
                    format!("{validity} (no organisation selected)")
                }
            }
            Self::Expired { can_refresh } => {
                if *can_refresh {
                    "Expired (will refresh on next request)".to_string()
                } else {
                    "Expired".to_string()
                }
            }
        }
    }
}

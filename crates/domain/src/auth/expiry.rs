//! Access token expiry rules
//!
//! A token is treated as unusable [`SAFETY_MARGIN_MS`] before its actual
//! expiry so a request is never sent with a token that lapses mid-flight.

/// Lead time before expiry at which the access token counts as expired.
pub const SAFETY_MARGIN_MS: i64 = 60_000;

/// Returns true if a token expiring at `expires_at` must not be used at `now`.
///
/// Both values are epoch millis. An `expires_at` of zero means no expiry is
/// stored, which is treated as expired.
#[must_use]
pub const fn is_expired_at(expires_at: i64, now: i64) -> bool {
    if expires_at == 0 {
        return true;
    }
    now >= expires_at.saturating_sub(SAFETY_MARGIN_MS)
}

/// Milliseconds until the token reaches the safety margin, floored at zero.
#[must_use]
pub const fn remaining_ms(expires_at: i64, now: i64) -> i64 {
    let usable_until = expires_at.saturating_sub(SAFETY_MARGIN_MS);
    if usable_until > now {
        usable_until - now
    } else {
        0
    }
}

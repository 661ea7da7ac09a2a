//! Wall-clock time source for token expiry.

use chrono::{DateTime, Utc};
use invoicer_application::ports::Clock;

/// Reads the host's UTC wall clock.
///
/// Token expiries are stored as epoch milliseconds computed from this clock
/// at acquisition time, so it must be the same clock that later decides
/// whether the token is still usable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

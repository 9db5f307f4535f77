//! Rate limit information for the GitHub search API.
//!
//! Search requests have a far smaller quota than the core API. When a search
//! is rejected for exceeding it, the gateway fetches the current limits so the
//! polling loop can wait for the window to reset instead of hammering the API.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit snapshot taken from the `/rate_limit` endpoint.
///
/// # Example
///
/// ```
/// use cutiebot::github::rate_limit::RateLimitInfo;
///
/// let info = RateLimitInfo::new(30, 0, 1_700_000_060);
/// assert!(info.is_exhausted());
/// assert_eq!(info.wait_from(1_700_000_000).as_secs(), 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    limit: u32,
    remaining: u32,
    /// Unix timestamp when the window resets.
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit snapshot.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Maximum requests allowed in the window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Requests left in the window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Unix timestamp when the window resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Returns true if no requests remain.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Time left until the reset, measured from the Unix timestamp `now`.
    #[must_use]
    pub const fn wait_from(&self, now: u64) -> Duration {
        Duration::from_secs(self.reset_at.saturating_sub(now))
    }

    /// Time left until the reset, measured from the system clock.
    ///
    /// Returns zero when the reset has passed or the clock is unavailable.
    #[must_use]
    pub fn wait(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(self.reset_at, |elapsed| elapsed.as_secs());
        self.wait_from(now)
    }
}

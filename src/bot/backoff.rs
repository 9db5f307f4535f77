//! Delay between polling cycles.

use std::time::Duration;

use crate::error::BotError;

/// Doubling delay after failed cycles, reset by a successful one.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use cutiebot::bot::Backoff;
/// use cutiebot::error::BotError;
///
/// let mut backoff = Backoff::new(Duration::from_secs(60), Duration::from_secs(1800));
/// let error = BotError::Network {
///     service: "GitHub".to_owned(),
///     message: "connection reset".to_owned(),
/// };
/// assert_eq!(backoff.failed(&error), Duration::from_secs(120));
/// assert_eq!(backoff.succeeded(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    current: Duration,
}

impl Backoff {
    /// Creates a backoff starting at `base` and never exceeding `cap`.
    #[must_use]
    pub const fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            current: base,
        }
    }

    /// Delay after a successful cycle.
    pub const fn succeeded(&mut self) -> Duration {
        self.current = self.base;
        self.current
    }

    /// Delay after a failed cycle.
    ///
    /// A rate limit rejection waits at least until the limit resets, still
    /// bounded by the cap.
    pub fn failed(&mut self, error: &BotError) -> Duration {
        self.current = self.current.saturating_mul(2).min(self.cap);

        if let BotError::RateLimitExceeded {
            rate_limit: Some(info),
            ..
        } = error
        {
            return info.wait().max(self.current).min(self.cap);
        }
        self.current
    }

    /// Delay that the next successful or failed cycle builds on.
    #[must_use]
    pub const fn current(&self) -> Duration {
        self.current
    }
}

//! Process-lifetime progress: where to resume and which pull request keeps
//! failing.

/// Resume position for the next scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeCursor {
    start: u64,
    last_processed: Option<u64>,
}

impl ResumeCursor {
    /// Creates a cursor that starts at `start` when nothing is known.
    #[must_use]
    pub const fn new(start: u64) -> Self {
        Self {
            start,
            last_processed: None,
        }
    }

    /// First pull request number to scan, given the highest number already
    /// posted.
    #[must_use]
    pub fn since(&self, posted: Option<u64>) -> u64 {
        self.last_processed
            .max(posted)
            .map_or(self.start, |number| number.saturating_add(1))
    }

    /// Marks `number` as fully handled. Never moves backwards.
    pub fn advance(&mut self, number: u64) {
        self.last_processed = self.last_processed.max(Some(number));
    }

    /// Highest number handled by this process.
    #[must_use]
    pub const fn last_processed(&self) -> Option<u64> {
        self.last_processed
    }
}

/// Counts consecutive failures of the same pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureTracker {
    max_attempts: u32,
    current: Option<(u64, u32)>,
}

impl FailureTracker {
    /// Creates a tracker that gives up after `max_attempts` failures.
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            current: None,
        }
    }

    /// Records a failure of `number`; returns true once it has failed
    /// `max_attempts` times in a row, which also resets the count.
    pub fn record_failure(&mut self, number: u64) -> bool {
        let attempts = match self.current {
            Some((failing, attempts)) if failing == number => attempts.saturating_add(1),
            _ => 1,
        };

        if attempts >= self.max_attempts {
            self.current = None;
            return true;
        }
        self.current = Some((number, attempts));
        false
    }

    /// Attempts recorded so far for `number`.
    #[must_use]
    pub fn attempts(&self, number: u64) -> u32 {
        match self.current {
            Some((failing, attempts)) if failing == number => attempts,
            _ => 0,
        }
    }

    /// Clears the count after a successful cycle.
    pub const fn reset(&mut self) {
        self.current = None;
    }
}

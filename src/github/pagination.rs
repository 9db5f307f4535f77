//! Window state for date-anchored pull request searches.
//!
//! The GitHub search API returns at most [`SEARCH_RESULT_LIMIT`] results per
//! query. A [`SearchWindow`] tracks the anchor date and page cursor of the
//! current query and reports when the next page would cross that cap, at
//! which point the caller restarts the search from a later anchor.

use chrono::NaiveDate;

/// Maximum number of results GitHub returns for a single search query.
pub const SEARCH_RESULT_LIMIT: u32 = 1000;

/// Pull requests requested per search page.
pub const SEARCH_PAGE_SIZE: u8 = 50;

/// Anchor date and page cursor for a capped search.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use cutiebot::github::pagination::SearchWindow;
///
/// let anchor = NaiveDate::from_ymd_opt(2016, 2, 19).expect("valid date");
/// let mut window = SearchWindow::new(anchor).with_limits(2, 4);
/// assert!(!window.is_exhausted());
/// window.advance();
/// window.advance();
/// assert!(window.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    /// Creation date the query is anchored on.
    anchor: NaiveDate,
    /// Current page number (1-based).
    page: u32,
    /// Items per page.
    per_page: u8,
    /// Total results the API will serve for one query.
    result_limit: u32,
}

impl SearchWindow {
    /// Creates a window at page 1 with the GitHub defaults.
    #[must_use]
    pub const fn new(anchor: NaiveDate) -> Self {
        Self {
            anchor,
            page: 1,
            per_page: SEARCH_PAGE_SIZE,
            result_limit: SEARCH_RESULT_LIMIT,
        }
    }

    /// Overrides the page size and result cap.
    #[must_use]
    pub const fn with_limits(mut self, per_page: u8, result_limit: u32) -> Self {
        self.per_page = per_page;
        self.result_limit = result_limit;
        self
    }

    /// Returns the anchor date.
    #[must_use]
    pub const fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Returns the current page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Moves to the next page.
    pub const fn advance(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Returns true when the current page starts at or beyond the result cap.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        let already_served = self.page.saturating_sub(1).saturating_mul(self.per_page as u32);
        already_served >= self.result_limit
    }

    /// Restarts the window from a new anchor date at page 1.
    pub const fn reanchor(&mut self, anchor: NaiveDate) {
        self.anchor = anchor;
        self.page = 1;
    }
}

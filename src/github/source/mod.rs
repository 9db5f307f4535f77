//! Ordered traversal of pull requests opened since a given number.
//!
//! GitHub search is the only listing endpoint that can filter by creation
//! date, but it serves at most [`SEARCH_RESULT_LIMIT`] results per query. The
//! scan anchors its query on the creation date of the starting pull request
//! and, whenever a window runs dry, restarts from the creation date of the
//! last pull request it saw. Numbers already yielded are filtered out, so
//! re-anchoring never produces duplicates.
//!
//! [`SEARCH_RESULT_LIMIT`]: crate::github::pagination::SEARCH_RESULT_LIMIT

use std::collections::VecDeque;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::BotError;

use super::gateway::{PullRequestGateway, SearchParams};
use super::locator::{PullRequestNumber, RepositoryLocator};
use super::models::PullRequest;
use super::pagination::{SEARCH_PAGE_SIZE, SEARCH_RESULT_LIMIT, SearchWindow};

/// What to do when the visitor fails for one pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisitErrorPolicy {
    /// Stop the traversal and return the error.
    #[default]
    Abort,
    /// Log the error and continue with the next pull request.
    Skip,
}

/// Reads pull requests of one repository through a gateway.
///
/// # Example
///
/// ```ignore
/// use cutiebot::github::{OctocrabGateway, PullRequestSource, RepositoryLocator};
///
/// let locator = RepositoryLocator::from_owner_repo("moby", "moby")?;
/// let gateway = OctocrabGateway::for_token(&token, &locator)?;
/// let source = PullRequestSource::new(&gateway, &locator);
/// let mut scan = source.scan_since(PullRequestNumber::new(20514)?).await?;
/// while let Some(pull) = scan.next().await? {
///     println!("{}", pull.html_url);
/// }
/// ```
pub struct PullRequestSource<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    client: &'client Gateway,
    locator: &'client RepositoryLocator,
    per_page: u8,
    result_limit: u32,
}

impl<'client, Gateway> PullRequestSource<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Creates a source using the GitHub page size and result cap.
    #[must_use]
    pub const fn new(client: &'client Gateway, locator: &'client RepositoryLocator) -> Self {
        Self {
            client,
            locator,
            per_page: SEARCH_PAGE_SIZE,
            result_limit: SEARCH_RESULT_LIMIT,
        }
    }

    /// Overrides the page size and the per-query result cap.
    #[must_use]
    pub const fn with_limits(mut self, per_page: u8, result_limit: u32) -> Self {
        self.per_page = per_page;
        self.result_limit = result_limit;
        self
    }

    /// Fetches exactly one pull request.
    ///
    /// # Errors
    ///
    /// Returns `BotError::PullRequestNotFound` when the number does not exist
    /// and gateway errors otherwise.
    pub async fn for_number(&self, number: PullRequestNumber) -> Result<PullRequest, BotError> {
        self.client.pull_request(self.locator, number).await
    }

    /// Starts a scan of pull requests numbered `since` or higher, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `BotError::PullRequestNotFound` when `since` itself does not
    /// exist yet, which is the normal state once every pull request has been
    /// visited.
    pub async fn scan_since(
        &self,
        since: PullRequestNumber,
    ) -> Result<PullRequestScan<'client, Gateway>, BotError> {
        let anchor = self.for_number(since).await?;
        let window = SearchWindow::new(anchor.created_at.date_naive())
            .with_limits(self.per_page, self.result_limit);

        Ok(PullRequestScan {
            client: self.client,
            locator: self.locator,
            window,
            buffer: VecDeque::new(),
            floor: since.get(),
            last_seen: None,
            finished: false,
        })
    }

    /// Visits every pull request numbered `since` or higher, oldest first.
    ///
    /// Returns how many pull requests were visited successfully.
    ///
    /// # Errors
    ///
    /// Returns scan errors, and visitor errors when `policy` is
    /// [`VisitErrorPolicy::Abort`].
    pub async fn for_each_since<Visit>(
        &self,
        since: PullRequestNumber,
        policy: VisitErrorPolicy,
        mut visit: Visit,
    ) -> Result<u64, BotError>
    where
        Visit: AsyncFnMut(PullRequest) -> Result<(), BotError>,
    {
        let mut scan = self.scan_since(since).await?;
        let mut visited = 0_u64;

        while let Some(pull) = scan.next().await? {
            let number = pull.number;
            match visit(pull).await {
                Ok(()) => visited += 1,
                Err(error) => match policy {
                    VisitErrorPolicy::Abort => return Err(error),
                    VisitErrorPolicy::Skip => {
                        tracing::warn!(number, %error, "skipping pull request");
                    }
                },
            }
        }

        Ok(visited)
    }
}

/// An in-progress scan. Call [`PullRequestScan::next`] until it yields `None`.
pub struct PullRequestScan<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    client: &'client Gateway,
    locator: &'client RepositoryLocator,
    window: SearchWindow,
    buffer: VecDeque<PullRequest>,
    /// Lowest number that may still be yielded.
    floor: u64,
    /// Creation date of the last pull request returned by the API.
    last_seen: Option<NaiveDate>,
    finished: bool,
}

impl<Gateway> PullRequestScan<'_, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Returns the next pull request, or `None` once the repository has
    /// been read to the end.
    ///
    /// # Errors
    ///
    /// Returns gateway errors, or `BotError::Api` when more pull requests
    /// share one creation date than a single search window can serve.
    pub async fn next(&mut self) -> Result<Option<PullRequest>, BotError> {
        loop {
            if let Some(pull) = self.buffer.pop_front() {
                return Ok(Some(pull));
            }
            if self.finished {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    async fn fetch_page(&mut self) -> Result<(), BotError> {
        if self.window.is_exhausted() {
            self.reanchor()?;
        }

        let params = SearchParams {
            created_since: self.window.anchor(),
            page: self.window.page(),
            per_page: self.window.per_page(),
        };
        let page = self
            .client
            .search_pull_requests(self.locator, &params)
            .await?;
        self.window.advance();

        debug!(
            anchor = %params.created_since,
            page = params.page,
            items = page.items.len(),
            "fetched search page"
        );

        if page.items.is_empty() {
            self.finished = true;
        }
        if let Some(last) = page.items.last() {
            self.last_seen = Some(last.created_at.date_naive());
        }

        for pull in page.items {
            if pull.number >= self.floor {
                self.floor = pull.number.saturating_add(1);
                self.buffer.push_back(pull);
            }
        }
        Ok(())
    }

    fn reanchor(&mut self) -> Result<(), BotError> {
        let anchor = self
            .last_seen
            .filter(|date| *date > self.window.anchor())
            .ok_or_else(|| {
                BotError::github_api(format!(
                    "search window cannot advance past {}",
                    self.window.anchor()
                ))
            })?;
        debug!(%anchor, "re-anchoring search window");
        self.window.reanchor(anchor);
        Ok(())
    }
}

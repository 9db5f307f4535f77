//! Resume point inferred from what the account has already published.
//!
//! Every post carries the permalink of the pull request it was taken from,
//! so the highest pull request number linked from the timeline marks where
//! the previous run stopped. No state file is needed.

use tracing::debug;

use crate::error::BotError;
use crate::github::RepositoryLocator;
use crate::twitter::PublishGateway;

/// Reads the publishing timeline to find the last posted pull request.
pub struct PostedStateTracker<'client, Publisher>
where
    Publisher: PublishGateway + ?Sized,
{
    publisher: &'client Publisher,
    account: &'client str,
    locator: &'client RepositoryLocator,
}

impl<'client, Publisher> PostedStateTracker<'client, Publisher>
where
    Publisher: PublishGateway + ?Sized,
{
    /// Creates a tracker for `account`, recognising permalinks into the
    /// repository described by `locator`.
    #[must_use]
    pub const fn new(
        publisher: &'client Publisher,
        account: &'client str,
        locator: &'client RepositoryLocator,
    ) -> Self {
        Self {
            publisher,
            account,
            locator,
        }
    }

    /// Highest pull request number linked from the most recent posts, or
    /// `None` when no post links to the repository.
    ///
    /// # Errors
    ///
    /// Returns gateway errors when the timeline cannot be read.
    pub async fn highest_posted_pull_number(&self) -> Result<Option<u64>, BotError> {
        let posts = self.publisher.recent_posts(self.account, None).await?;

        let highest = posts
            .iter()
            .flat_map(|post| post.links.iter())
            .filter_map(|link| self.locator.pull_request_number_from_link(link))
            .max();

        debug!(account = self.account, posts = posts.len(), ?highest, "inspected timeline");
        Ok(highest)
    }
}

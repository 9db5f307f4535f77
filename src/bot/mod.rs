//! Polling orchestrator.
//!
//! Each cycle asks the timeline where the last run stopped, scans the pull
//! requests opened since then, and publishes the cutie of every pull request
//! that has one. Cycles repeat with [`Backoff`] between them until the
//! shutdown signal fires.

mod backoff;
mod cursor;

pub use backoff::Backoff;
pub use cursor::{FailureTracker, ResumeCursor};

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::CutieConfig;
use crate::cutie::{
    self, ImageFetcher, NormalizedPayload, ScreenshotDetector, UniformBackgroundDetector,
};
use crate::error::BotError;
use crate::github::pagination::{SEARCH_PAGE_SIZE, SEARCH_RESULT_LIMIT};
use crate::github::{
    PullRequest, PullRequestGateway, PullRequestNumber, PullRequestSource, RepositoryLocator,
    VisitErrorPolicy,
};
use crate::posted::PostedStateTracker;
use crate::twitter::{Post, PublishGateway};

/// Tunables of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    /// Account cuties are published to.
    pub account: String,
    /// Account that receives operator notifications.
    pub notify_account: Option<String>,
    /// First pull request scanned when nothing was posted yet.
    pub start_pull: u64,
    /// Text appended to the permalink.
    pub post_suffix: String,
    /// Consecutive failures of one pull request before giving up on it.
    pub max_attempts: u32,
    /// Reaction to a failing pull request.
    pub item_policy: VisitErrorPolicy,
    /// Delay between successful cycles.
    pub poll_interval: Duration,
    /// Upper bound of the delay after failures.
    pub max_backoff: Duration,
    /// Search page size.
    pub per_page: u8,
    /// Results one search query may serve.
    pub result_limit: u32,
}

impl BotSettings {
    /// Extracts orchestrator settings from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Configuration`] for an unknown item error policy.
    pub fn from_config(config: &CutieConfig) -> Result<Self, BotError> {
        Ok(Self {
            account: config.account.clone(),
            notify_account: config.notify_account.clone(),
            start_pull: config.start_pull,
            post_suffix: config.post_suffix.clone(),
            max_attempts: config.max_attempts,
            item_policy: config.item_policy()?,
            poll_interval: config.poll_interval(),
            max_backoff: config.max_backoff(),
            per_page: SEARCH_PAGE_SIZE,
            result_limit: SEARCH_RESULT_LIMIT,
        })
    }
}

/// How one pull request was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The cutie was published.
    Posted(Post),
    /// Normalisation produced nothing to post.
    Empty,
}

/// Counters for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// First pull request number scanned.
    pub since: u64,
    /// Pull requests handled without error.
    pub visited: u64,
    /// Cuties published.
    pub posted: u64,
    /// Pull requests skipped after an error under the `skip` policy.
    pub failed: u64,
}

/// The bot: gateways plus the state that survives between cycles.
pub struct CutieBot<Github, Publisher, Fetcher>
where
    Github: PullRequestGateway,
    Publisher: PublishGateway,
    Fetcher: ImageFetcher,
{
    github: Github,
    publisher: Publisher,
    fetcher: Fetcher,
    detector: Box<dyn ScreenshotDetector>,
    locator: RepositoryLocator,
    settings: BotSettings,
    cursor: ResumeCursor,
    failures: FailureTracker,
    backoff: Backoff,
}

impl<Github, Publisher, Fetcher> CutieBot<Github, Publisher, Fetcher>
where
    Github: PullRequestGateway,
    Publisher: PublishGateway,
    Fetcher: ImageFetcher,
{
    /// Creates a bot using the uniform background screenshot heuristic.
    #[must_use]
    pub fn new(
        github: Github,
        publisher: Publisher,
        fetcher: Fetcher,
        locator: RepositoryLocator,
        settings: BotSettings,
    ) -> Self {
        Self {
            cursor: ResumeCursor::new(settings.start_pull),
            failures: FailureTracker::new(settings.max_attempts),
            backoff: Backoff::new(settings.poll_interval, settings.max_backoff),
            github,
            publisher,
            fetcher,
            detector: Box::new(UniformBackgroundDetector::default()),
            locator,
            settings,
        }
    }

    /// Replaces the screenshot heuristic.
    #[must_use]
    pub fn with_detector(mut self, detector: Box<dyn ScreenshotDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Runs cycles until `shutdown` completes.
    ///
    /// Cycle failures are logged and delay the next cycle; they never end the
    /// loop.
    pub async fn run_until<Shutdown>(&mut self, shutdown: Shutdown)
    where
        Shutdown: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let delay = match self.run_cycle().await {
                Ok(report) => {
                    info!(
                        since = report.since,
                        visited = report.visited,
                        posted = report.posted,
                        failed = report.failed,
                        "cycle finished"
                    );
                    self.backoff.succeeded()
                }
                Err(error) => {
                    let retry_in = self.backoff.failed(&error);
                    warn!(%error, retry_in_seconds = retry_in.as_secs(), "cycle failed");
                    retry_in
                }
            };

            tokio::select! {
                () = &mut shutdown => {
                    info!("shutting down");
                    return;
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Scans every pull request since the resume point once.
    ///
    /// # Errors
    ///
    /// Returns timeline, scan, and (under the `abort` policy) pull request
    /// errors. `PullRequestNotFound` means no pull request exists past the
    /// resume point yet.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, BotError> {
        let posted = PostedStateTracker::new(&self.publisher, &self.settings.account, &self.locator)
            .highest_posted_pull_number()
            .await?;
        let since = self.cursor.since(posted);
        let mut report = CycleReport {
            since,
            ..CycleReport::default()
        };
        debug!(since, ?posted, "starting cycle");

        let source = PullRequestSource::new(&self.github, &self.locator)
            .with_limits(self.settings.per_page, self.settings.result_limit);

        let mut scan = match source.scan_since(PullRequestNumber::new(since)?).await {
            Ok(scan) => scan,
            Err(error @ BotError::PullRequestNotFound { .. }) => {
                debug!(since, "no pull request to resume from yet");
                return Err(error);
            }
            Err(error) => {
                self.report_scan_failure(since, &error).await;
                return Err(error);
            }
        };

        loop {
            let pull = match scan.next().await {
                Ok(Some(pull)) => pull,
                Ok(None) => break,
                Err(error) => {
                    self.report_scan_failure(since, &error).await;
                    return Err(error);
                }
            };

            let detector = Some(self.detector.as_ref());
            match self.handle_pull(&pull, detector).await {
                Ok(outcome) => {
                    if matches!(outcome, Outcome::Posted(_)) {
                        report.posted += 1;
                    }
                    report.visited += 1;
                    self.cursor.advance(pull.number);
                }
                Err(error) if error.is_skippable() => {
                    debug!(number = pull.number, %error, "nothing to post");
                    report.visited += 1;
                    self.cursor.advance(pull.number);
                }
                Err(error) => {
                    warn!(number = pull.number, %error, "cannot handle pull request");
                    if self.failures.record_failure(pull.number) {
                        self.give_up(&pull, &error).await;
                        self.cursor.advance(pull.number);
                    }
                    match self.settings.item_policy {
                        VisitErrorPolicy::Abort => return Err(error),
                        VisitErrorPolicy::Skip => report.failed += 1,
                    }
                }
            }
        }

        self.failures.reset();
        Ok(report)
    }

    /// Publishes one pull request without the screenshot check.
    ///
    /// # Errors
    ///
    /// Returns `PullRequestNotFound` for unknown numbers, `ImageNotFound`
    /// when the description has no image, and image or publishing errors
    /// otherwise.
    pub async fn post_single(&self, number: u64) -> Result<Outcome, BotError> {
        let source = PullRequestSource::new(&self.github, &self.locator);
        let pull = source.for_number(PullRequestNumber::new(number)?).await?;
        self.handle_pull(&pull, None).await
    }

    /// Deletes every post of the account, oldest pages last.
    ///
    /// Individual delete failures are logged and skipped. Returns how many
    /// posts were deleted.
    ///
    /// # Errors
    ///
    /// Returns timeline errors.
    pub async fn wipe_account(&self) -> Result<u64, BotError> {
        let mut max_id = None;
        let mut deleted = 0_u64;

        loop {
            let posts = self
                .publisher
                .recent_posts(&self.settings.account, max_id)
                .await?;
            let Some(oldest) = posts.iter().map(|post| post.id).min() else {
                break;
            };

            for post in &posts {
                info!(id = post.id, text = %post.text, "deleting post");
                match self.publisher.delete_post(post.id).await {
                    Ok(()) => deleted += 1,
                    Err(error) => warn!(id = post.id, %error, "cannot delete post"),
                }
            }

            match oldest.checked_sub(1) {
                Some(next) => max_id = Some(next),
                None => break,
            }
        }

        Ok(deleted)
    }

    /// Highest pull request number handled by this process.
    #[must_use]
    pub const fn last_processed(&self) -> Option<u64> {
        self.cursor.last_processed()
    }

    async fn handle_pull(
        &self,
        pull: &PullRequest,
        detector: Option<&dyn ScreenshotDetector>,
    ) -> Result<Outcome, BotError> {
        let Some(body) = pull.body.as_deref() else {
            debug!(number = pull.number, "pull request has no description");
            return Err(BotError::ImageNotFound);
        };
        let image = cutie::resolve(body).ok_or(BotError::ImageNotFound)?;

        let payload = match cutie::prepare(&image, &self.fetcher, detector).await {
            Ok(payload) => payload,
            Err(BotError::ScreenshotDetected) => {
                warn!(number = pull.number, url = %pull.html_url, "screenshot detected");
                self.notify(&format!(
                    "{} Screenshot detected: {}",
                    pull.number, pull.html_url
                ))
                .await;
                return Err(BotError::ScreenshotDetected);
            }
            Err(error) => return Err(error),
        };

        if payload.is_empty() {
            return Ok(Outcome::Empty);
        }

        info!(number = pull.number, url = %pull.html_url, image = %image.url, "posting cutie");
        match self.publish(&pull.html_url, &payload).await {
            Ok(post) => Ok(Outcome::Posted(post)),
            Err(error) => {
                self.notify(&format!("Cannot post tweet: {error}")).await;
                Err(error)
            }
        }
    }

    async fn publish(&self, permalink: &str, payload: &NormalizedPayload) -> Result<Post, BotError> {
        let media_id = self.publisher.upload_media(payload.as_str()).await?;
        let text = format!("{permalink} {}", self.settings.post_suffix);
        self.publisher.publish_post(text.trim_end(), media_id).await
    }

    async fn give_up(&self, pull: &PullRequest, error: &BotError) {
        self.notify(&format!(
            "Cannot get cutie from pull request {}, {}: {error}",
            pull.number, pull.html_url
        ))
        .await;
    }

    async fn report_scan_failure(&self, since: u64, error: &BotError) {
        warn!(since, %error, "scan failed");
        self.notify(&format!("Error for pull requests since {since}: {error}"))
            .await;
    }

    async fn notify(&self, text: &str) {
        let Some(account) = self.settings.notify_account.as_deref() else {
            info!(text, "operator notification");
            return;
        };
        if let Err(error) = self.publisher.send_direct_notification(account, text).await {
            warn!(%error, text, "cannot notify operator");
        }
    }
}

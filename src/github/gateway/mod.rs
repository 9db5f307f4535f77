//! Gateways for reading pull requests through Octocrab.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests.

mod client;
mod error_mapping;
mod search;

pub use search::OctocrabGateway;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::BotError;
use crate::github::locator::{PullRequestNumber, RepositoryLocator};
use crate::github::models::{PullRequest, SearchPage};

/// Parameters for one page of a creation-date search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Only pull requests created on or after this date are returned.
    pub created_since: NaiveDate,
    /// Page number to fetch (1-based).
    pub page: u32,
    /// Items per page (max 100).
    pub per_page: u8,
}

/// Gateway that can read pull requests of a repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch a single pull request by number.
    async fn pull_request(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<PullRequest, BotError>;

    /// Search pull requests created on or after a date, oldest first.
    async fn search_pull_requests(
        &self,
        locator: &RepositoryLocator,
        params: &SearchParams,
    ) -> Result<SearchPage, BotError>;
}

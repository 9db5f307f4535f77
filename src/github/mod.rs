//! Read-only access to the pull requests of a GitHub repository.
//!
//! This module wraps Octocrab to look up single pull requests and to walk
//! every pull request opened since a given number, working around the cap the
//! search API places on each query. Errors are mapped into [`BotError`]
//! variants so callers never see Octocrab internals.
//!
//! [`BotError`]: crate::error::BotError

pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod source;

pub use gateway::{OctocrabGateway, PullRequestGateway, SearchParams};
pub use locator::{
    PersonalAccessToken, PullRequestNumber, RepositoryLocator, RepositoryName, RepositoryOwner,
};
pub use models::{PullRequest, SearchPage};
pub use rate_limit::RateLimitInfo;
pub use source::{PullRequestScan, PullRequestSource, VisitErrorPolicy};

#[cfg(test)]
pub use gateway::MockPullRequestGateway;

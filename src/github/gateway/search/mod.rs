//! Octocrab implementation of the pull request gateway.

use std::time::Duration;

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::error::BotError;
use crate::github::locator::{PersonalAccessToken, PullRequestNumber, RepositoryLocator};
use crate::github::models::{ApiIssue, ApiSearchResults, PullRequest, SearchPage};
use crate::github::rate_limit::RateLimitInfo;

use super::client::{DEFAULT_REQUEST_TIMEOUT, build_octocrab_client};
use super::error_mapping::{is_not_found, is_rate_limit_error, map_octocrab_error};
use super::{PullRequestGateway, SearchParams};

const SEARCH_PATH: &str = "/search/issues";

/// Octocrab-backed gateway.
pub struct OctocrabGateway {
    client: Octocrab,
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a gateway for `token` against the API base of `locator`,
    /// with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns `BotError::InvalidUrl` when the base URI cannot be parsed or
    /// `BotError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &PersonalAccessToken,
        locator: &RepositoryLocator,
    ) -> Result<Self, BotError> {
        Self::with_timeout(token, locator, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Like [`OctocrabGateway::for_token`] with an explicit connect and read
    /// timeout.
    ///
    /// # Errors
    ///
    /// Same as [`OctocrabGateway::for_token`].
    pub fn with_timeout(
        token: &PersonalAccessToken,
        locator: &RepositoryLocator,
        timeout: Duration,
    ) -> Result<Self, BotError> {
        let octocrab = build_octocrab_client(token, locator.api_base(), timeout)?;
        Ok(Self::new(octocrab))
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabGateway {
    async fn pull_request(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<PullRequest, BotError> {
        match self
            .client
            .get::<ApiIssue, _, _>(locator.issue_path(number), None::<&()>)
            .await
        {
            Ok(issue) => Ok(issue.into()),
            Err(error) if is_not_found(&error) => Err(BotError::PullRequestNotFound {
                number: number.get(),
            }),
            Err(error) => Err(self
                .map_octocrab_error_with_rate_limit("pull request", &error, Quota::Core)
                .await),
        }
    }

    async fn search_pull_requests(
        &self,
        locator: &RepositoryLocator,
        params: &SearchParams,
    ) -> Result<SearchPage, BotError> {
        validate_pagination_params(params.page, params.per_page)?;

        let query = locator.created_since_query(params.created_since);
        let page_str = params.page.to_string();
        let per_page_str = params.per_page.to_string();

        let query_params = [
            ("q", query.as_str()),
            ("sort", "created"),
            ("order", "asc"),
            ("page", page_str.as_str()),
            ("per_page", per_page_str.as_str()),
        ];

        match self
            .client
            .get::<ApiSearchResults, _, _>(SEARCH_PATH, Some(&query_params))
            .await
        {
            Ok(results) => Ok(results.into()),
            Err(error) => Err(self
                .map_octocrab_error_with_rate_limit("search pulls", &error, Quota::Search)
                .await),
        }
    }
}

/// Rate limit bucket an endpoint draws from.
#[derive(Debug, Clone, Copy)]
enum Quota {
    Core,
    Search,
}

impl OctocrabGateway {
    async fn map_octocrab_error_with_rate_limit(
        &self,
        operation: &str,
        error: &octocrab::Error,
        quota: Quota,
    ) -> BotError {
        match error {
            octocrab::Error::GitHub { source, .. } if is_rate_limit_error(source) => {
                let rate_limit = self.fetch_rate_limit(quota).await;
                let base_message =
                    format!("{operation} failed: {message}", message = source.message);
                let message = match &rate_limit {
                    Some(info) => format!(
                        "{base_message} (resets at {reset})",
                        reset = info.reset_at()
                    ),
                    None => base_message,
                };

                BotError::RateLimitExceeded {
                    rate_limit,
                    message,
                }
            }
            _ => map_octocrab_error(operation, error),
        }
    }

    async fn fetch_rate_limit(&self, quota: Quota) -> Option<RateLimitInfo> {
        let resources = self.client.ratelimit().get().await.ok()?.resources;
        let rate = match quota {
            Quota::Core => resources.core,
            Quota::Search => resources.search,
        };
        let Ok(limit) = u32::try_from(rate.limit) else {
            return None;
        };
        let Ok(remaining) = u32::try_from(rate.remaining) else {
            return None;
        };
        Some(RateLimitInfo::new(limit, remaining, rate.reset))
    }
}

fn validate_pagination_params(page: u32, per_page: u8) -> Result<(), BotError> {
    if page == 0 {
        return Err(BotError::InvalidPagination {
            message: "page must be at least 1".to_owned(),
        });
    }

    if per_page == 0 {
        return Err(BotError::InvalidPagination {
            message: "per_page must be at least 1".to_owned(),
        });
    }

    if per_page > 100 {
        return Err(BotError::InvalidPagination {
            message: "per_page must not exceed 100".to_owned(),
        });
    }

    Ok(())
}

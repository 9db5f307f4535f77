//! Repository identity wrappers and GitHub URL derivation.

use chrono::NaiveDate;
use url::Url;

use crate::error::BotError;

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, BotError> {
        if value.is_empty() {
            return Err(BotError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, BotError> {
        if value.is_empty() {
            return Err(BotError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Validates that the number is positive.
    ///
    /// # Errors
    ///
    /// Returns `BotError::InvalidPullRequestNumber` for zero.
    pub const fn new(value: u64) -> Result<Self, BotError> {
        if value == 0 {
            return Err(BotError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `BotError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, BotError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BotError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

const GITHUB_WEB: &str = "https://github.com";
const GITHUB_API: &str = "https://api.github.com";

fn parse_url(input: &str) -> Result<Url, BotError> {
    Url::parse(input).map_err(|error| BotError::InvalidUrl(error.to_string()))
}

/// Repository coordinates plus the web and API bases used to reach it.
///
/// # Example
///
/// ```
/// use cutiebot::github::RepositoryLocator;
///
/// let locator = RepositoryLocator::from_owner_repo("moby", "moby")
///     .expect("should build locator");
/// assert_eq!(locator.full_name(), "moby/moby");
/// assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    web_base: Url,
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a locator for a repository hosted on `github.com`.
    ///
    /// # Errors
    ///
    /// Returns `BotError::MissingPathSegments` when owner or repo is empty.
    pub fn from_owner_repo(owner: &str, repo: &str) -> Result<Self, BotError> {
        Ok(Self {
            web_base: parse_url(GITHUB_WEB)?,
            api_base: parse_url(GITHUB_API)?,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repo)?,
        })
    }

    /// Replaces the API base, keeping the web host used for permalinks.
    ///
    /// # Errors
    ///
    /// Returns `BotError::InvalidUrl` when the base cannot be parsed.
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, BotError> {
        self.api_base = parse_url(api_base)?;
        Ok(self)
    }

    /// API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Web base URL that pull request permalinks live under.
    #[must_use]
    pub const fn web_base(&self) -> &Url {
        &self.web_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// `owner/repo` form used in search qualifiers.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    /// Issue path for a number; pull requests share the issue namespace.
    pub(crate) fn issue_path(&self, number: PullRequestNumber) -> String {
        format!(
            "/repos/{}/{}/issues/{}",
            self.owner.as_str(),
            self.repository.as_str(),
            number.get()
        )
    }

    /// Search query for pull requests created on or after `since`.
    pub(crate) fn created_since_query(&self, since: NaiveDate) -> String {
        format!(
            "is:pr repo:{} created:>={}",
            self.full_name(),
            since.format("%Y-%m-%d")
        )
    }

    /// Extracts the pull request number from a permalink into this
    /// repository, e.g. `https://github.com/moby/moby/pull/100`.
    ///
    /// Returns `None` for links to other hosts, other repositories, or
    /// non-pull-request pages.
    #[must_use]
    pub fn pull_request_number_from_link(&self, link: &str) -> Option<u64> {
        let parsed = Url::parse(link).ok()?;
        let host = parsed.host_str()?;
        let expected_host = self.web_base.host_str()?;
        if !host.eq_ignore_ascii_case(expected_host)
            && !host.eq_ignore_ascii_case(&format!("www.{expected_host}"))
        {
            return None;
        }

        let mut segments = parsed.path_segments()?.filter(|segment| !segment.is_empty());
        let owner = segments.next()?;
        let repository = segments.next()?;
        let marker = segments.next()?;
        let number = segments.next()?;
        if segments.next().is_some()
            || marker != "pull"
            || !owner.eq_ignore_ascii_case(self.owner.as_str())
            || !repository.eq_ignore_ascii_case(self.repository.as_str())
        {
            return None;
        }

        number.parse::<u64>().ok().filter(|value| *value > 0)
    }
}

//! Bot configuration loaded from CLI, environment, and files.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – the Docker cuties setup (`moby/moby` into
//!    `DockerCuties`)
//! 2. **Configuration file** – `.cutiebot.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `CUTIEBOT_*`, plus `GITHUB_TOKEN` as a
//!    token fallback
//! 4. **Command-line arguments** – `--delete`, `--pull-to-post`,
//!    `--log-level`, and the rest
//!
//! # Configuration File
//!
//! ```toml
//! owner = "moby"
//! repo = "moby"
//! account = "DockerCuties"
//! notify_account = "maintainer"
//! tokens_file = "/etc/cutiebot/TOKENS"
//! item_error_policy = "skip"
//! ```

use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::credentials::{Credentials, DEFAULT_TOKENS_FILE};
use crate::error::BotError;
use crate::github::{RepositoryLocator, VisitErrorPolicy};
use crate::twitter::gateway::{DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE};

/// First pull request whose template asked for a cute animal picture.
pub const DEFAULT_START_PULL: u64 = 20_514;

const DEFAULT_OWNER: &str = "moby";
const DEFAULT_REPO: &str = "moby";
const DEFAULT_ACCOUNT: &str = "DockerCuties";
const DEFAULT_POST_SUFFIX: &str = "#dockercuties #docker";
const DEFAULT_LOG_LEVEL: &str = "warning";
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 60;
const DEFAULT_MAX_BACKOFF_SECONDS: u64 = 1_800;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_ITEM_ERROR_POLICY: &str = "abort";

/// What the binary should do this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Poll for new pull requests until interrupted.
    Poll,
    /// Publish one pull request and exit.
    PostSingle(u64),
    /// Delete every post of the account and exit.
    WipeAccount,
}

/// Bot configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use cutiebot::CutieConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = CutieConfig::load().expect("failed to load configuration");
/// config.validate().expect("configuration should be consistent");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "CUTIEBOT",
    discovery(
        dotfile_name = ".cutiebot.toml",
        config_file_name = "cutiebot.toml",
        app_name = "cutiebot"
    )
)]
pub struct CutieConfig {
    /// Owner of the repository whose pull requests are scanned.
    #[ortho_config(cli_short = 'o')]
    pub owner: String,

    /// Name of the repository whose pull requests are scanned.
    #[ortho_config(cli_short = 'r')]
    pub repo: String,

    /// Account the cuties are published to.
    #[ortho_config(cli_short = 'a')]
    pub account: String,

    /// Account that receives operator notifications by direct message.
    ///
    /// When unset, notifications are only logged.
    #[ortho_config()]
    pub notify_account: Option<String>,

    /// Pull request number scanning starts from when nothing was posted yet.
    #[ortho_config()]
    pub start_pull: u64,

    /// Path of the credential file.
    #[ortho_config(cli_short = 'k')]
    pub tokens_file: String,

    /// GitHub personal access token.
    ///
    /// Falls back to `GITHUB_TOKEN`, then to `githubPersonalAccessToken` in
    /// the credential file.
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise or testing.
    #[ortho_config()]
    pub github_api_base: Option<String>,

    /// Publishing REST API base URL.
    #[ortho_config()]
    pub twitter_api_base: String,

    /// Publishing media upload base URL.
    #[ortho_config()]
    pub twitter_upload_base: String,

    /// Deletes every post of the account, then exits.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment, so use `--delete` or the config file.
    #[ortho_config(cli_short = 'd')]
    pub delete: bool,

    /// Publishes this one pull request, skipping the screenshot check, then
    /// exits.
    #[ortho_config(cli_short = 'p')]
    pub pull_to_post: Option<u64>,

    /// Log level: `trace`, `debug`, `info`, `warn`, `error`, or one of the
    /// aliases `warning`, `fatal`, `panic`. Defaults to `warning`.
    #[ortho_config(cli_short = 'l')]
    pub log_level: String,

    /// Seconds to sleep between successful polling cycles.
    #[ortho_config()]
    pub poll_interval_seconds: u64,

    /// Upper bound for the delay after failed cycles.
    #[ortho_config()]
    pub max_backoff_seconds: u64,

    /// Consecutive failures of one pull request before it is given up on.
    #[ortho_config()]
    pub max_attempts: u32,

    /// Timeout for image downloads and publishing requests.
    #[ortho_config()]
    pub http_timeout_seconds: u64,

    /// What to do when one pull request fails: `abort` retries the whole scan
    /// next cycle, `skip` moves on.
    #[ortho_config()]
    pub item_error_policy: String,

    /// Text appended to the permalink in every post.
    #[ortho_config()]
    pub post_suffix: String,
}

impl Default for CutieConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_owned(),
            repo: DEFAULT_REPO.to_owned(),
            account: DEFAULT_ACCOUNT.to_owned(),
            notify_account: None,
            start_pull: DEFAULT_START_PULL,
            tokens_file: DEFAULT_TOKENS_FILE.to_owned(),
            token: None,
            github_api_base: None,
            twitter_api_base: DEFAULT_API_BASE.to_owned(),
            twitter_upload_base: DEFAULT_UPLOAD_BASE.to_owned(),
            delete: false,
            pull_to_post: None,
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            max_backoff_seconds: DEFAULT_MAX_BACKOFF_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            item_error_policy: DEFAULT_ITEM_ERROR_POLICY.to_owned(),
            post_suffix: DEFAULT_POST_SUFFIX.to_owned(),
        }
    }
}

fn configuration_error(message: impl Into<String>) -> BotError {
    BotError::Configuration {
        message: message.into(),
    }
}

impl CutieConfig {
    /// Checks the configuration for inconsistent values.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Configuration`] naming the first offending value.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.delete && self.pull_to_post.is_some() {
            return Err(configuration_error(
                "--delete and --pull-to-post cannot be combined",
            ));
        }
        if self.pull_to_post == Some(0) || self.start_pull == 0 {
            return Err(configuration_error(
                "pull request numbers must be positive",
            ));
        }
        if self.account.trim().is_empty() {
            return Err(configuration_error("account must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(configuration_error("max_attempts must be at least 1"));
        }
        if self.poll_interval_seconds == 0 || self.http_timeout_seconds == 0 {
            return Err(configuration_error(
                "poll_interval_seconds and http_timeout_seconds must be positive",
            ));
        }
        if self.max_backoff_seconds < self.poll_interval_seconds {
            return Err(configuration_error(
                "max_backoff_seconds must not be below poll_interval_seconds",
            ));
        }
        self.item_policy()?;
        self.locator()?;
        Ok(())
    }

    /// Determines what this run should do.
    #[must_use]
    pub const fn run_mode(&self) -> RunMode {
        if self.delete {
            RunMode::WipeAccount
        } else if let Some(number) = self.pull_to_post {
            RunMode::PostSingle(number)
        } else {
            RunMode::Poll
        }
    }

    /// Parses `item_error_policy`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Configuration`] for values other than `abort` and
    /// `skip`.
    pub fn item_policy(&self) -> Result<VisitErrorPolicy, BotError> {
        match self.item_error_policy.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(VisitErrorPolicy::Abort),
            "skip" => Ok(VisitErrorPolicy::Skip),
            other => Err(configuration_error(format!(
                "item_error_policy must be abort or skip, got {other:?}"
            ))),
        }
    }

    /// Builds the locator of the scanned repository.
    ///
    /// # Errors
    ///
    /// Returns locator errors for empty names or an unparseable API base.
    pub fn locator(&self) -> Result<RepositoryLocator, BotError> {
        let locator = RepositoryLocator::from_owner_repo(&self.owner, &self.repo)?;
        match &self.github_api_base {
            Some(base) => locator.with_api_base(base),
            None => Ok(locator),
        }
    }

    /// Resolves the GitHub token from configuration, the `GITHUB_TOKEN`
    /// environment variable, or the credential file, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::MissingToken`] when no source provides a value.
    pub fn resolve_token(&self, credentials: &Credentials) -> Result<String, BotError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .or_else(|| credentials.github_token.clone())
            .filter(|token| !token.trim().is_empty())
            .ok_or(BotError::MissingToken)
    }

    /// Path of the credential file.
    #[must_use]
    pub fn tokens_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.tokens_file)
    }

    /// Delay between successful cycles.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Upper bound for the delay after failed cycles.
    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_seconds)
    }

    /// Timeout for outgoing HTTP requests.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

#[cfg(test)]
mod tests;

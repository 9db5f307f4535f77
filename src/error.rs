//! Error types shared by every layer of the bot.

use thiserror::Error;

use crate::github::rate_limit::RateLimitInfo;

/// Errors surfaced while scanning pull requests, preparing images, or
/// talking to the publishing account.
///
/// `ImageNotFound` and `ScreenshotDetected` are terminal outcomes for a single
/// pull request rather than failures; [`BotError::is_skippable`] reports them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BotError {
    /// The pull request description contains no image markup.
    #[error("picture not found")]
    ImageNotFound,

    /// The image looks like a plain screen capture.
    #[error("picture is screenshot")]
    ScreenshotDetected,

    /// The image host could not be reached or answered with a failure.
    #[error("cannot download {url}: {message}")]
    Fetch {
        /// Image URL that was requested.
        url: String,
        /// Transport or status detail.
        message: String,
    },

    /// The downloaded bytes are not a recognised image container.
    #[error("cannot decode image: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// Re-encoding or downsizing the image failed.
    #[error("cannot encode image: {message}")]
    Encode {
        /// Encoder error detail.
        message: String,
    },

    /// The decoded image uses a format the encoder cannot produce.
    #[error("unknown image format {format:?}")]
    UnsupportedFormat {
        /// Name of the offending format.
        format: String,
    },

    /// A pull request number does not exist in the repository.
    #[error("pull request {number} not found")]
    PullRequestNotFound {
        /// Number that was requested.
        number: u64,
    },

    /// A configured base URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// The repository owner or name is empty.
    #[error("repository must be given as owner and name")]
    MissingPathSegments,

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The GitHub personal access token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// A line of the credential file could not be understood.
    #[error("cannot identify credential in line {line:?}")]
    MalformedCredential {
        /// The offending line, verbatim.
        line: String,
    },

    /// A required credential was absent from the credential file.
    #[error("credential {name} is missing")]
    MissingCredential {
        /// Name of the credential field.
        name: String,
    },

    /// An upstream API rejected the credentials.
    #[error("{service} rejected the credentials: {message}")]
    Authentication {
        /// Service that rejected the request.
        service: String,
        /// Error message returned with the 401/403 response.
        message: String,
    },

    /// An upstream API returned a non-authentication error.
    #[error("{service} API error: {message}")]
    Api {
        /// Service that reported the failure.
        service: String,
        /// Response detail describing the failure.
        message: String,
    },

    /// Networking failed while calling an upstream API.
    #[error("network error talking to {service}: {message}")]
    Network {
        /// Service that could not be reached.
        service: String,
        /// Transport-level error detail.
        message: String,
    },

    /// Rate limit exceeded on the GitHub API.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Rate limit info if available.
        rate_limit: Option<RateLimitInfo>,
        /// Error message from GitHub.
        message: String,
    },

    /// Invalid pagination parameters.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}

impl BotError {
    /// Returns true for outcomes that end processing of one pull request
    /// without counting as a failure.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(self, Self::ImageNotFound | Self::ScreenshotDetected)
    }

    pub(crate) fn github_api(message: impl Into<String>) -> Self {
        Self::Api {
            service: "GitHub".to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn twitter_api(message: impl Into<String>) -> Self {
        Self::Api {
            service: "Twitter".to_owned(),
            message: message.into(),
        }
    }
}

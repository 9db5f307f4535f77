//! Error mapping helpers for the Octocrab gateway.

use http::StatusCode;

use crate::error::BotError;

const SERVICE: &str = "GitHub";

/// Checks if a GitHub error status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if an octocrab error represents a network/transport issue.
pub(super) const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Checks if an octocrab error is a GitHub 404 response.
pub(super) fn is_not_found(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::GitHub { source, .. } if source.status_code == StatusCode::NOT_FOUND
    )
}

/// Checks whether the GitHub error represents a rate limit error based on the
/// HTTP status and message / documentation URL content.
pub(super) fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    let is_rate_limit_status = matches!(
        source.status_code,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    );

    let message_indicates_rate_limit = source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"));

    is_rate_limit_status && message_indicates_rate_limit
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> BotError {
    if let octocrab::Error::GitHub { source, .. } = error {
        let message = format!(
            "{operation} failed with status {status}: {message}",
            status = source.status_code,
            message = source.message
        );
        return if is_auth_failure(source.status_code) {
            BotError::Authentication {
                service: SERVICE.to_owned(),
                message,
            }
        } else {
            BotError::github_api(message)
        };
    }

    if is_network_error(error) {
        return BotError::Network {
            service: SERVICE.to_owned(),
            message: format!("{operation} failed: {error}"),
        };
    }

    BotError::github_api(format!("{operation} failed: {error}"))
}

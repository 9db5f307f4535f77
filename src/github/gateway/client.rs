//! Authenticated Octocrab client for one API base.

use std::time::Duration;

use http::Uri;
use octocrab::Octocrab;
use url::Url;

use crate::error::BotError;
use crate::github::locator::PersonalAccessToken;

use super::error_mapping::map_octocrab_error;

/// Connect and read timeout used when the caller does not pick one.
pub(super) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds a client that authenticates with `token` against `api_base`.
///
/// # Errors
///
/// Returns `BotError::InvalidUrl` when the base is not a valid URI,
/// `BotError::Api` when Octocrab rejects it, and mapped Octocrab errors when
/// the client cannot be built.
pub(super) fn build_octocrab_client(
    token: &PersonalAccessToken,
    api_base: &Url,
    timeout: Duration,
) -> Result<Octocrab, BotError> {
    let base_uri = Uri::try_from(api_base.as_str())
        .map_err(|error| BotError::InvalidUrl(format!("{api_base}: {error}")))?;

    Octocrab::builder()
        .personal_token(token.as_ref())
        .set_connect_timeout(Some(timeout))
        .set_read_timeout(Some(timeout))
        .base_uri(base_uri)
        .map_err(|error| BotError::github_api(format!("cannot use API base {api_base}: {error}")))?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}

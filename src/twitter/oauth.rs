//! OAuth 1.0a request signing (HMAC-SHA1).

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha1::Sha1;
use urlencoding::encode;

use crate::error::BotError;

type HmacSha1 = Hmac<Sha1>;

const NONCE_LENGTH: usize = 32;

/// Application and user secrets for the publishing account.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
}

impl OAuthCredentials {
    /// Bundles the four OAuth secrets.
    #[must_use]
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

/// Builds the `Authorization` header for a request.
///
/// `params` are the query or form parameters sent with the request; JSON
/// bodies are not signed.
pub(crate) fn authorization_header(
    credentials: &OAuthCredentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, BotError> {
    let nonce: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect();
    let timestamp = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    sign(credentials, method, url, params, &nonce, timestamp)
}

fn sign(
    credentials: &OAuthCredentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    nonce: &str,
    timestamp: u64,
) -> Result<String, BotError> {
    let timestamp_text = timestamp.to_string();
    let mut oauth_params = vec![
        ("oauth_consumer_key", credentials.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp_text.as_str()),
        ("oauth_token", credentials.token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let signature = signature(credentials, method, url, params, &oauth_params)?;
    oauth_params.push(("oauth_signature", signature.as_str()));
    oauth_params.sort_unstable();

    let fields: Vec<String> = oauth_params
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
        .collect();
    Ok(format!("OAuth {}", fields.join(", ")))
}

fn signature(
    credentials: &OAuthCredentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    oauth_params: &[(&str, &str)],
) -> Result<String, BotError> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .chain(oauth_params)
        .map(|(key, value)| (encode(key).into_owned(), encode(value).into_owned()))
        .collect();
    pairs.sort_unstable();

    let parameter_string = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let base_string = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&parameter_string)
    );
    let signing_key = format!(
        "{}&{}",
        encode(&credentials.consumer_secret),
        encode(&credentials.token_secret)
    );

    let mut mac =
        HmacSha1::new_from_slice(signing_key.as_bytes()).map_err(|error| BotError::Configuration {
            message: format!("invalid signing key: {error}"),
        })?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{OAuthCredentials, authorization_header, sign};

    #[fixture]
    fn credentials() -> OAuthCredentials {
        OAuthCredentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
    }

    #[rstest]
    fn matches_published_signature_example(credentials: OAuthCredentials) {
        let header = sign(
            &credentials,
            "post",
            "https://api.twitter.com/1.1/statuses/update.json",
            &[
                ("include_entities", "true"),
                ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ],
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            1_318_622_958,
        )
        .expect("signing should succeed");

        assert!(
            header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""),
            "unexpected header: {header}"
        );
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
    }

    #[rstest]
    fn fresh_headers_use_distinct_nonces(credentials: OAuthCredentials) {
        let first = authorization_header(&credentials, "GET", "https://api.example/x", &[])
            .expect("signing should succeed");
        let second = authorization_header(&credentials, "GET", "https://api.example/x", &[])
            .expect("signing should succeed");
        assert_ne!(first, second);
    }

    #[rstest]
    fn debug_output_hides_secrets(credentials: OAuthCredentials) {
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"));
        assert!(rendered.contains("xvz1evFS4wEEPTGEFPHBog"));
    }
}

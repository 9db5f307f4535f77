//! `reqwest` implementation of the publishing gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::BotError;
use crate::twitter::models::{ApiErrors, ApiMedia, ApiTweet, ApiUser, Post};
use crate::twitter::oauth::{OAuthCredentials, authorization_header};

use super::PublishGateway;

/// Public REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Media upload API base.
pub const DEFAULT_UPLOAD_BASE: &str = "https://upload.twitter.com";

const SERVICE: &str = "Twitter";
const TIMELINE_PAGE_SIZE: &str = "200";

/// Signed HTTP client for the publishing account.
#[derive(Debug, Clone)]
pub struct TwitterGateway {
    client: reqwest::Client,
    credentials: OAuthCredentials,
    api_base: String,
    upload_base: String,
}

impl TwitterGateway {
    /// Creates a gateway for the public endpoints.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Configuration` when the HTTP client cannot be
    /// constructed.
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| BotError::Configuration {
                message: format!("cannot build {SERVICE} HTTP client: {error}"),
            })?;
        Ok(Self {
            client,
            credentials,
            api_base: DEFAULT_API_BASE.to_owned(),
            upload_base: DEFAULT_UPLOAD_BASE.to_owned(),
        })
    }

    /// Replaces the API and upload bases.
    ///
    /// # Errors
    ///
    /// Returns `BotError::InvalidUrl` when either base cannot be parsed.
    pub fn with_bases(mut self, api_base: &str, upload_base: &str) -> Result<Self, BotError> {
        self.api_base = normalise_base(api_base)?;
        self.upload_base = normalise_base(upload_base)?;
        Ok(self)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/1.1/{path}", self.api_base)
    }

    fn signed(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<RequestBuilder, BotError> {
        let header = authorization_header(&self.credentials, method.as_str(), url, params)?;
        Ok(self
            .client
            .request(method, url)
            .header(AUTHORIZATION, header))
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, BotError> {
        let response = request.send().await.map_err(|error| BotError::Network {
            service: SERVICE.to_owned(),
            message: format!("{operation} failed: {error}"),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(operation, status, &body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, BotError> {
        self.send(operation, request)
            .await?
            .json::<T>()
            .await
            .map_err(|error| BotError::twitter_api(format!("{operation} returned {error}")))
    }

    async fn user_id(&self, account: &str) -> Result<String, BotError> {
        let url = self.api_url("users/show.json");
        let params = [("screen_name", account)];
        let request = self.signed(Method::GET, &url, &params)?.query(&params);
        let user: ApiUser = self.send_json("look up user", request).await?;
        Ok(user.id_str)
    }
}

fn normalise_base(base: &str) -> Result<String, BotError> {
    Url::parse(base).map_err(|error| BotError::InvalidUrl(error.to_string()))?;
    Ok(base.trim_end_matches('/').to_owned())
}

fn map_status_error(operation: &str, status: StatusCode, body: &str) -> BotError {
    let detail = serde_json::from_str::<ApiErrors>(body)
        .ok()
        .and_then(|errors| errors.summary())
        .unwrap_or_else(|| body.trim().to_owned());
    let message = format!("{operation} failed with status {status}: {detail}");

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        BotError::Authentication {
            service: SERVICE.to_owned(),
            message,
        }
    } else {
        BotError::twitter_api(message)
    }
}

#[async_trait]
impl PublishGateway for TwitterGateway {
    async fn recent_posts(
        &self,
        account: &str,
        max_id: Option<u64>,
    ) -> Result<Vec<Post>, BotError> {
        let url = self.api_url("statuses/user_timeline.json");
        let max_id_text = max_id.map(|id| id.to_string());
        let mut params = vec![
            ("count", TIMELINE_PAGE_SIZE),
            ("include_entities", "true"),
            ("screen_name", account),
            ("trim_user", "true"),
        ];
        if let Some(text) = max_id_text.as_deref() {
            params.push(("max_id", text));
        }

        let request = self.signed(Method::GET, &url, &params)?.query(&params);
        let tweets: Vec<ApiTweet> = self.send_json("read timeline", request).await?;
        debug!(account, count = tweets.len(), ?max_id, "read timeline page");
        Ok(tweets.into_iter().map(ApiTweet::into).collect())
    }

    async fn upload_media(&self, media_base64: &str) -> Result<u64, BotError> {
        let url = format!("{}/1.1/media/upload.json", self.upload_base);
        let params = [("media_data", media_base64)];
        let request = self.signed(Method::POST, &url, &params)?.form(&params);
        let media: ApiMedia = self.send_json("upload media", request).await?;
        debug!(media_id = media.media_id, "uploaded media");
        Ok(media.media_id)
    }

    async fn publish_post(&self, text: &str, media_id: u64) -> Result<Post, BotError> {
        let url = self.api_url("statuses/update.json");
        let media_ids = media_id.to_string();
        let params = [("media_ids", media_ids.as_str()), ("status", text)];
        let request = self.signed(Method::POST, &url, &params)?.form(&params);
        let tweet: ApiTweet = self.send_json("publish post", request).await?;
        Ok(tweet.into())
    }

    async fn delete_post(&self, id: u64) -> Result<(), BotError> {
        let url = self.api_url(&format!("statuses/destroy/{id}.json"));
        let request = self.signed(Method::POST, &url, &[])?;
        self.send("delete post", request).await?;
        Ok(())
    }

    async fn send_direct_notification(&self, account: &str, text: &str) -> Result<(), BotError> {
        let recipient_id = self.user_id(account).await?;
        let url = self.api_url("direct_messages/events/new.json");
        let body = json!({
            "event": {
                "type": "message_create",
                "message_create": {
                    "target": { "recipient_id": recipient_id },
                    "message_data": { "text": text }
                }
            }
        });
        let request = self.signed(Method::POST, &url, &[])?.json(&body);
        self.send("send direct message", request).await?;
        Ok(())
    }
}

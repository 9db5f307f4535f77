//! Gateway to the publishing account.
//!
//! The trait keeps the orchestrator testable with mocks; [`TwitterGateway`]
//! talks to the REST v1.1 endpoints with OAuth 1.0a signed requests.

mod client;

pub use client::{DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE, TwitterGateway};

use async_trait::async_trait;

use crate::error::BotError;

use super::models::Post;

/// Operations the bot performs against the publishing account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishGateway: Send + Sync {
    /// Most recent posts of `account`, newest first. `max_id` restricts the
    /// page to posts with an id at or below it.
    async fn recent_posts(&self, account: &str, max_id: Option<u64>)
    -> Result<Vec<Post>, BotError>;

    /// Uploads base64-encoded media and returns its media id.
    async fn upload_media(&self, media_base64: &str) -> Result<u64, BotError>;

    /// Publishes `text` with the uploaded media attached.
    async fn publish_post(&self, text: &str, media_id: u64) -> Result<Post, BotError>;

    /// Deletes a post.
    async fn delete_post(&self, id: u64) -> Result<(), BotError>;

    /// Sends a direct message to `account`.
    async fn send_direct_notification(&self, account: &str, text: &str) -> Result<(), BotError>;
}

//! Publishing account access: signed requests, posts, and notifications.

pub mod gateway;
pub mod models;
pub mod oauth;

pub use gateway::{PublishGateway, TwitterGateway};
pub use models::Post;
pub use oauth::OAuthCredentials;

#[cfg(test)]
pub use gateway::MockPublishGateway;

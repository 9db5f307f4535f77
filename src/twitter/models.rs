//! Posts as returned by the publishing API.
//!
//! Types prefixed with `Api` are internal deserialisation targets.

use serde::Deserialize;

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Numeric post identifier.
    pub id: u64,
    /// Post text.
    pub text: String,
    /// Expanded URLs embedded in the post, in order of appearance.
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiTweet {
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default)]
    pub(crate) full_text: Option<String>,
    #[serde(default)]
    pub(crate) entities: ApiEntities,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiEntities {
    #[serde(default)]
    pub(crate) urls: Vec<ApiUrl>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUrl {
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) expanded_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiMedia {
    pub(crate) media_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) id_str: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiErrors {
    #[serde(default)]
    pub(crate) errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub(crate) code: Option<i64>,
    pub(crate) message: String,
}

impl From<ApiTweet> for Post {
    fn from(value: ApiTweet) -> Self {
        let links = value
            .entities
            .urls
            .into_iter()
            .filter_map(|entity| entity.expanded_url.or(entity.url))
            .collect();
        Self {
            id: value.id,
            text: value.full_text.or(value.text).unwrap_or_default(),
            links,
        }
    }
}

impl ApiErrors {
    /// Joins the reported messages, or returns `None` when there are none.
    pub(crate) fn summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|detail| match detail.code {
                Some(code) => format!("{} (code {code})", detail.message),
                None => detail.message.clone(),
            })
            .collect();
        Some(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{ApiErrors, ApiTweet, Post};

    #[rstest]
    fn tweet_links_prefer_expanded_urls() {
        let value = json!({
            "id": 42,
            "id_str": "42",
            "text": "https://t.co/abc #dockercuties #docker",
            "entities": {
                "hashtags": [],
                "urls": [
                    { "url": "https://t.co/abc", "expanded_url": "https://github.com/moby/moby/pull/100" },
                    { "url": "https://t.co/def" }
                ]
            }
        });

        let tweet: ApiTweet = serde_json::from_value(value).expect("tweet should deserialise");
        let post: Post = tweet.into();

        assert_eq!(post.id, 42);
        assert_eq!(
            post.links,
            vec![
                "https://github.com/moby/moby/pull/100".to_owned(),
                "https://t.co/def".to_owned()
            ]
        );
    }

    #[rstest]
    fn tweet_without_entities_has_no_links() {
        let tweet: ApiTweet =
            serde_json::from_value(json!({ "id": 7, "full_text": "hello" }))
                .expect("tweet should deserialise");
        let post: Post = tweet.into();

        assert_eq!(post.text, "hello");
        assert!(post.links.is_empty());
    }

    #[rstest]
    fn error_summary_joins_messages() {
        let errors: ApiErrors = serde_json::from_value(json!({
            "errors": [
                { "code": 187, "message": "Status is a duplicate." },
                { "message": "Try again later" }
            ]
        }))
        .expect("errors should deserialise");

        assert_eq!(
            errors.summary().as_deref(),
            Some("Status is a duplicate. (code 187); Try again later")
        );
        assert_eq!(ApiErrors::default().summary(), None);
    }
}

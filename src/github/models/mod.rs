//! Pull request models returned by the GitHub API.
//!
//! Types prefixed with `Api` are internal deserialisation targets that convert
//! into public domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[cfg(feature = "test-support")]
pub mod test_support;

/// A pull request as seen by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// HTML URL used as the permalink in published posts.
    pub html_url: String,
    /// Description markup, absent when the author left it empty.
    pub body: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// One page of pull request search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// Pull requests on this page in ascending creation order.
    pub items: Vec<PullRequest>,
    /// Total matches reported by the search API.
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiIssue {
    pub(crate) number: u64,
    pub(crate) html_url: String,
    pub(crate) body: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiSearchResults {
    pub(crate) total_count: u64,
    #[serde(default)]
    pub(crate) items: Vec<ApiIssue>,
}

impl From<ApiIssue> for PullRequest {
    fn from(value: ApiIssue) -> Self {
        Self {
            number: value.number,
            html_url: value.html_url,
            body: value.body,
            created_at: value.created_at,
        }
    }
}

impl From<ApiSearchResults> for SearchPage {
    fn from(value: ApiSearchResults) -> Self {
        Self {
            items: value.items.into_iter().map(ApiIssue::into).collect(),
            total_count: value.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{ApiIssue, ApiSearchResults, PullRequest, SearchPage};

    #[rstest]
    fn api_issue_deserialises_pull_request_fields() {
        let value = json!({
            "number": 20514,
            "title": "Add cute animal to the template",
            "html_url": "https://github.com/moby/moby/pull/20514",
            "body": "![cat](https://example.com/cat.png)",
            "created_at": "2016-02-19T17:50:13Z",
            "pull_request": { "url": "https://api.github.com/repos/moby/moby/pulls/20514" }
        });

        let issue: ApiIssue = serde_json::from_value(value).expect("ApiIssue should deserialise");
        let pull: PullRequest = issue.into();

        assert_eq!(pull.number, 20514);
        assert_eq!(pull.html_url, "https://github.com/moby/moby/pull/20514");
        assert_eq!(pull.body.as_deref(), Some("![cat](https://example.com/cat.png)"));
        assert_eq!(pull.created_at.to_rfc3339(), "2016-02-19T17:50:13+00:00");
    }

    #[rstest]
    fn null_body_is_preserved_as_none() {
        let value = json!({
            "number": 3,
            "html_url": "https://github.com/moby/moby/pull/3",
            "body": null,
            "created_at": "2016-02-19T17:50:13Z"
        });

        let issue: ApiIssue = serde_json::from_value(value).expect("ApiIssue should deserialise");
        assert!(issue.body.is_none());
    }

    #[rstest]
    fn search_results_convert_in_order() {
        let value = json!({
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                { "number": 5, "html_url": "u5", "body": null, "created_at": "2016-02-19T00:00:00Z" },
                { "number": 6, "html_url": "u6", "body": "x", "created_at": "2016-02-20T00:00:00Z" }
            ]
        });

        let results: ApiSearchResults =
            serde_json::from_value(value).expect("search results should deserialise");
        let page: SearchPage = results.into();

        assert_eq!(page.total_count, 2);
        let numbers: Vec<u64> = page.items.iter().map(|pull| pull.number).collect();
        assert_eq!(numbers, vec![5, 6]);
    }
}

//! Test helpers for building GitHub API response bodies.
//!
//! These helpers produce the JSON shapes served by mock servers so that
//! behavioural tests do not repeat the issue and search payload layout.
//!
//! # Examples
//!
//! ```
//! use cutiebot::github::models::test_support::{issue_json, search_page_json};
//!
//! let issue = issue_json(7, "2016-02-19", Some("![x](https://example.com/x.png)"));
//! assert_eq!(issue["number"], 7);
//!
//! let page = search_page_json(&[issue]);
//! assert_eq!(page["total_count"], 1);
//! ```

use serde_json::{Value, json};

/// Builds an issue body for pull request `number` created at midday on
/// `date` (`YYYY-MM-DD`).
#[must_use]
pub fn issue_json(number: u64, date: &str, body: Option<&str>) -> Value {
    json!({
        "number": number,
        "title": format!("Pull request {number}"),
        "html_url": format!("https://github.com/moby/moby/pull/{number}"),
        "body": body,
        "created_at": format!("{date}T12:00:00Z"),
        "pull_request": {}
    })
}

/// Wraps issues in a search response envelope.
#[must_use]
pub fn search_page_json(items: &[Value]) -> Value {
    json!({
        "total_count": items.len(),
        "incomplete_results": false,
        "items": items
    })
}

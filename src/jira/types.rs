//! Wire-shaped types for the Jira Cloud REST v3 API.
//!
//! Payloads stay as `serde_json::Value`; only the pagination envelope is
//! given structure so callers can drive the loops.

use serde_json::Value as JsonValue;

/// One page of a token-paginated JQL search.
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Raw issue objects as returned by the search endpoint.
    pub issues: Vec<JsonValue>,
    /// Opaque token for the next page; absent on the last page.
    pub next_page_token: Option<String>,
    /// Whether the server marked this page as the last one.
    pub is_last: bool,
    /// Approximate total match count, when the server reports one.
    pub total: Option<u64>,
}

impl SearchPage {
    /// True when another page should be requested.
    pub fn has_more(&self) -> bool {
        !self.is_last && self.next_page_token.is_some()
    }
}

/// A fully hydrated issue with its sub-resources drained.
#[derive(Debug, Clone)]
pub struct IssueDetail {
    /// The issue payload including rendered fields and changelog.
    pub raw: JsonValue,
    /// Every comment on the issue, across all offset pages.
    pub comments: Vec<JsonValue>,
    /// Every worklog on the issue, across all offset pages.
    pub worklogs: Vec<JsonValue>,
}

/// Which sub-resources `fetch_issue_detail` should drain.
#[derive(Debug, Clone, Copy)]
pub struct IssueDetailOptions {
    pub include_comments: bool,
    pub include_worklogs: bool,
}

impl Default for IssueDetailOptions {
    fn default() -> Self {
        Self {
            include_comments: true,
            include_worklogs: true,
        }
    }
}

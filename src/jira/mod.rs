//! Jira Cloud transport layer: search, issue detail, and sub-resource
//! pagination, plus JQL construction for the tracked-user window.

pub mod client;
pub mod types;

pub use client::JiraClient;
pub use types::{IssueDetail, IssueDetailOptions, SearchPage};

use chrono::{DateTime, Utc};

/// Builds the JQL that scopes a batch to one project, its tracked accounts,
/// and the incremental window.
///
/// The assignee clause matches current assignment and historical assignment
/// so issues reassigned away from a tracked user still sync. The timestamp is
/// rendered at minute precision, the finest granularity JQL accepts.
pub fn build_jql(project_key: &str, account_ids: &[String], since: DateTime<Utc>) -> String {
    let accounts = account_ids
        .iter()
        .map(|id| format!("\"{}\"", id))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "project = {} AND (assignee in ({}) OR assignee was in ({})) AND updated >= \"{}\" ORDER BY updated ASC",
        project_key,
        accounts,
        accounts,
        since.format("%Y-%m-%d %H:%M"),
    )
}

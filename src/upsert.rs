//! Entity persistence for fetched Jira payloads.
//!
//! Every writer follows the same find-then-insert-or-update shape so replays
//! of the same remote page are idempotent. Callers wrap a whole issue in one
//! transaction via `upsert_issue_detail`.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::EngineError;
use crate::jira::IssueDetail;
use crate::models::{comment, issue, jira_user, sprint, worklog};

/// Jira renders timestamps like `2024-03-05T14:30:00.000+0000`, which is not
/// quite RFC 3339. Accept both forms.
fn parse_remote_timestamp(value: Option<&JsonValue>) -> Option<DateTimeWithTimeZone> {
    let s = value?.as_str()?;
    DateTime::<FixedOffset>::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
}

/// Comment bodies may arrive as plain strings or as Atlassian Document
/// Format objects. Objects are stored serialized.
fn body_text(value: Option<&JsonValue>) -> Option<String> {
    match value {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(other) if !other.is_null() => Some(other.to_string()),
        _ => None,
    }
}

fn str_field<'a>(value: &'a JsonValue, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str())
}

/// Upserts a Jira user from any payload fragment carrying `accountId`.
/// Returns the account id, or `None` when the fragment has no identity.
pub async fn upsert_user<C: ConnectionTrait>(
    db: &C,
    user: &JsonValue,
) -> Result<Option<String>, EngineError> {
    let account_id = match str_field(user, "accountId") {
        Some(id) => id.to_string(),
        None => return Ok(None),
    };
    let display_name = str_field(user, "displayName").unwrap_or("Unknown").to_string();
    let email = str_field(user, "emailAddress").map(|s| s.to_string());
    let avatar_url = user
        .get("avatarUrls")
        .and_then(|a| a.get("48x48"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let now: DateTimeWithTimeZone = Utc::now().into();

    match jira_user::Entity::find_by_id(&account_id).one(db).await? {
        Some(existing) => {
            let mut active: jira_user::ActiveModel = existing.into();
            active.display_name = Set(display_name);
            active.email = Set(email);
            active.avatar_url = Set(avatar_url);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            jira_user::ActiveModel {
                account_id: Set(account_id.clone()),
                display_name: Set(display_name),
                email: Set(email),
                avatar_url: Set(avatar_url),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(Some(account_id))
}

/// Ensures an author row exists for a comment or worklog, synthesizing a
/// placeholder identity when the payload carries no `accountId` (deleted or
/// anonymized accounts).
async fn ensure_author<C: ConnectionTrait>(
    db: &C,
    author: Option<&JsonValue>,
    fallback_id: &str,
) -> Result<String, EngineError> {
    if let Some(author) = author {
        if let Some(account_id) = upsert_user(db, author).await? {
            return Ok(account_id);
        }
    }

    let account_id = format!("anon-{}", fallback_id);
    let display_name = author
        .and_then(|a| str_field(a, "displayName"))
        .unwrap_or("Former user")
        .to_string();
    let now: DateTimeWithTimeZone = Utc::now().into();

    if jira_user::Entity::find_by_id(&account_id).one(db).await?.is_none() {
        jira_user::ActiveModel {
            account_id: Set(account_id.clone()),
            display_name: Set(display_name),
            email: Set(None),
            avatar_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
    }
    Ok(account_id)
}

/// Extracts the issue's active sprint from `customfield_10020` (or a plain
/// `sprint` field) and upserts it. Returns the sprint id when present.
pub async fn upsert_sprint<C: ConnectionTrait>(
    db: &C,
    fields: &JsonValue,
) -> Result<Option<i64>, EngineError> {
    let entry = fields
        .get("customfield_10020")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .or_else(|| fields.get("sprint"))
        .filter(|v| v.is_object());
    let entry = match entry {
        Some(e) => e,
        None => return Ok(None),
    };
    let id = match entry.get("id").and_then(|v| v.as_i64()) {
        Some(id) => id,
        None => return Ok(None),
    };

    let name = str_field(entry, "name").unwrap_or("Unnamed sprint").to_string();
    let state = str_field(entry, "state").map(|s| s.to_string());
    let board_id = entry.get("boardId").and_then(|v| v.as_i64());
    let start_date = parse_remote_timestamp(entry.get("startDate"));
    let end_date = parse_remote_timestamp(entry.get("endDate"));
    let now: DateTimeWithTimeZone = Utc::now().into();

    match sprint::Entity::find_by_id(id).one(db).await? {
        Some(existing) => {
            let mut active: sprint::ActiveModel = existing.into();
            active.name = Set(name);
            active.state = Set(state);
            active.board_id = Set(board_id);
            active.start_date = Set(start_date);
            active.end_date = Set(end_date);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            sprint::ActiveModel {
                id: Set(id),
                name: Set(name),
                state: Set(state),
                board_id: Set(board_id),
                start_date: Set(start_date),
                end_date: Set(end_date),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(Some(id))
}

async fn upsert_comment<C: ConnectionTrait>(
    db: &C,
    issue_id: &str,
    payload: &JsonValue,
) -> Result<(), EngineError> {
    let id = match str_field(payload, "id") {
        Some(id) => id.to_string(),
        None => return Ok(()),
    };
    let author_account_id = ensure_author(db, payload.get("author"), &id).await?;
    let body = body_text(payload.get("body"));
    let remote_created_at = parse_remote_timestamp(payload.get("created"));
    let remote_updated_at = parse_remote_timestamp(payload.get("updated"));
    let now: DateTimeWithTimeZone = Utc::now().into();

    match comment::Entity::find_by_id(&id).one(db).await? {
        Some(existing) => {
            let mut active: comment::ActiveModel = existing.into();
            active.author_account_id = Set(author_account_id);
            active.body = Set(body);
            active.remote_created_at = Set(remote_created_at);
            active.remote_updated_at = Set(remote_updated_at);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            comment::ActiveModel {
                id: Set(id),
                issue_id: Set(issue_id.to_string()),
                author_account_id: Set(author_account_id),
                body: Set(body),
                remote_created_at: Set(remote_created_at),
                remote_updated_at: Set(remote_updated_at),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

async fn upsert_worklog<C: ConnectionTrait>(
    db: &C,
    issue_id: &str,
    payload: &JsonValue,
) -> Result<(), EngineError> {
    let id = match str_field(payload, "id") {
        Some(id) => id.to_string(),
        None => return Ok(()),
    };
    let author_account_id = ensure_author(db, payload.get("author"), &id).await?;
    let time_spent_seconds = payload
        .get("timeSpentSeconds")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    let started_at = parse_remote_timestamp(payload.get("started"));
    let comment_text = body_text(payload.get("comment"));
    let now: DateTimeWithTimeZone = Utc::now().into();

    match worklog::Entity::find_by_id(&id).one(db).await? {
        Some(existing) => {
            let mut active: worklog::ActiveModel = existing.into();
            active.author_account_id = Set(author_account_id);
            active.time_spent_seconds = Set(time_spent_seconds);
            active.started_at = Set(started_at);
            active.comment = Set(comment_text);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            worklog::ActiveModel {
                id: Set(id),
                issue_id: Set(issue_id.to_string()),
                author_account_id: Set(author_account_id),
                time_spent_seconds: Set(time_spent_seconds),
                started_at: Set(started_at),
                comment: Set(comment_text),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

/// Persists a fully hydrated issue: assignee, sprint, the issue row with its
/// raw payload, then every comment and worklog.
///
/// Run this inside a transaction so a mid-issue failure leaves no partial
/// rows. Returns the issue's remote `updated` timestamp for cursor
/// advancement.
pub async fn upsert_issue_detail<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    detail: &IssueDetail,
) -> Result<Option<DateTimeWithTimeZone>, EngineError> {
    let raw = &detail.raw;
    let issue_id = str_field(raw, "id")
        .ok_or_else(|| EngineError::State("issue payload missing id".to_string()))?
        .to_string();
    let issue_key = str_field(raw, "key")
        .ok_or_else(|| EngineError::State("issue payload missing key".to_string()))?
        .to_string();
    let empty = JsonValue::Null;
    let fields = raw.get("fields").unwrap_or(&empty);

    let assignee_account_id = match fields.get("assignee") {
        Some(assignee) if !assignee.is_null() => upsert_user(db, assignee).await?,
        _ => None,
    };
    let sprint_id = upsert_sprint(db, fields).await?;

    let summary = str_field(fields, "summary").unwrap_or("").to_string();
    let status = fields
        .get("status")
        .and_then(|s| s.get("name"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let issue_type = fields
        .get("issuetype")
        .and_then(|t| t.get("name"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let remote_created_at = parse_remote_timestamp(fields.get("created"));
    let remote_updated_at = parse_remote_timestamp(fields.get("updated"));
    let now: DateTimeWithTimeZone = Utc::now().into();

    match issue::Entity::find_by_id(&issue_id).one(db).await? {
        Some(existing) => {
            let mut active: issue::ActiveModel = existing.into();
            active.key = Set(issue_key.clone());
            active.project_id = Set(project_id);
            active.assignee_account_id = Set(assignee_account_id);
            active.sprint_id = Set(sprint_id);
            active.summary = Set(summary);
            active.status = Set(status);
            active.issue_type = Set(issue_type);
            active.remote_created_at = Set(remote_created_at);
            active.remote_updated_at = Set(remote_updated_at);
            active.payload = Set(raw.clone());
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            issue::ActiveModel {
                id: Set(issue_id.clone()),
                key: Set(issue_key.clone()),
                project_id: Set(project_id),
                assignee_account_id: Set(assignee_account_id),
                sprint_id: Set(sprint_id),
                summary: Set(summary),
                status: Set(status),
                issue_type: Set(issue_type),
                remote_created_at: Set(remote_created_at),
                remote_updated_at: Set(remote_updated_at),
                payload: Set(raw.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }

    for c in &detail.comments {
        upsert_comment(db, &issue_id, c).await?;
    }
    for w in &detail.worklogs {
        upsert_worklog(db, &issue_id, w).await?;
    }

    debug!(
        issue = %issue_key,
        comments = detail.comments.len(),
        worklogs = detail.worklogs.len(),
        "issue persisted"
    );
    Ok(remote_updated_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_jira_offset_timestamps() {
        let v = json!("2024-03-05T14:30:00.000+0000");
        let parsed = parse_remote_timestamp(Some(&v)).unwrap();
        assert_eq!(parsed.timestamp(), 1709649000);
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let v = json!("2024-03-05T14:30:00+00:00");
        assert!(parse_remote_timestamp(Some(&v)).is_some());
    }

    #[test]
    fn rejects_malformed_timestamps() {
        let v = json!("yesterday");
        assert!(parse_remote_timestamp(Some(&v)).is_none());
    }

    #[test]
    fn adf_bodies_are_serialized() {
        let v = json!({"type": "doc", "content": []});
        let text = body_text(Some(&v)).unwrap();
        assert!(text.contains("\"doc\""));
    }

    #[test]
    fn string_bodies_pass_through() {
        let v = json!("plain text");
        assert_eq!(body_text(Some(&v)).unwrap(), "plain text");
    }

    #[test]
    fn null_bodies_are_none() {
        assert!(body_text(Some(&JsonValue::Null)).is_none());
        assert!(body_text(None).is_none());
    }
}

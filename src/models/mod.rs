//! # Data Models
//!
//! SeaORM entities for the sync engine's durable state (jobs, per-entity sync
//! states, audit logs) and the normalized Jira domain tables, plus the
//! string-backed status enums shared across the orchestrator and repositories.

pub mod comment;
pub mod issue;
pub mod jira_user;
pub mod project;
pub mod sprint;
pub mod sync_job;
pub mod sync_log;
pub mod sync_state;
pub mod tracked_user;
pub mod worklog;

pub use comment::Entity as Comment;
pub use issue::Entity as Issue;
pub use jira_user::Entity as JiraUser;
pub use project::Entity as Project;
pub use sprint::Entity as Sprint;
pub use sync_job::Entity as SyncJob;
pub use sync_log::Entity as SyncLog;
pub use sync_state::Entity as SyncState;
pub use tracked_user::Entity as TrackedUser;
pub use worklog::Entity as Worklog;

use serde::{Deserialize, Serialize};

/// The three independently-tracked entity kinds per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Issue,
    Comment,
    Worklog,
}

impl EntityKind {
    /// All kinds, in the order their state rows are created.
    pub const ALL: [EntityKind; 3] = [EntityKind::Issue, EntityKind::Comment, EntityKind::Worklog];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Issue => "issue",
            EntityKind::Comment => "comment",
            EntityKind::Worklog => "worklog",
        }
    }
}

/// Per-run status of a sync state row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }
}

/// Lifecycle status of a project's sync job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Active,
    Paused,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Active => "active",
            JobStatus::Paused => "paused",
            JobStatus::Error => "error",
        }
    }
}

/// Severity of a sync log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

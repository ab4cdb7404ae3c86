//! Issue entity model
//!
//! Keyed by the external Jira issue id. The full vendor payload is retained as
//! a JSON blob next to the normalized columns so schema drift on the remote
//! side never loses data.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    /// External Jira issue id (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Human-facing issue key (e.g. "PROJ-42")
    pub key: String,

    pub project_id: Uuid,

    pub assignee_account_id: Option<String>,

    pub sprint_id: Option<i64>,

    pub summary: String,

    pub status: Option<String>,

    pub issue_type: Option<String>,

    pub remote_created_at: Option<DateTimeWithTimeZone>,

    /// Remote `updated` timestamp; drives the high-water mark
    pub remote_updated_at: Option<DateTimeWithTimeZone>,

    /// Full vendor payload, stored opaquely
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: JsonValue,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::jira_user::Entity",
        from = "Column::AssigneeAccountId",
        to = "super::jira_user::Column::AccountId"
    )]
    Assignee,
    #[sea_orm(
        belongs_to = "super::sprint::Entity",
        from = "Column::SprintId",
        to = "super::sprint::Column::Id"
    )]
    Sprint,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::worklog::Entity")]
    Worklog,
}

impl Related<super::sprint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sprint.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::worklog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worklog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

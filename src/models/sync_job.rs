//! SyncJob entity model
//!
//! One row per project tracking schedule identity and run status. The
//! `cursor` column is the durable in-flight page cursor the run loop persists
//! after every batch so a process restart resumes mid-run instead of
//! re-pulling the whole window.

use super::project::Entity as Project;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_jobs")]
pub struct Model {
    /// Unique identifier for the sync job (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning project; unique, one job per project
    pub project_id: Uuid,

    /// Workflow identity derived from the project id (serializes runs per project)
    pub workflow_id: String,

    /// Schedule identity derived from the project id
    pub schedule_id: String,

    /// Cron cadence for scheduled runs
    pub cron_schedule: String,

    /// Current status (pending, active, paused, error)
    pub status: String,

    pub last_run_at: Option<DateTimeWithTimeZone>,

    pub next_run_at: Option<DateTimeWithTimeZone>,

    /// In-flight `{next_page_token, last_updated_at}` cursor, cleared at finalize/fail
    #[sea_orm(column_type = "JsonBinary")]
    pub cursor: Option<JsonValue>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Project",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<Project> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

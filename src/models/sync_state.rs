//! SyncState entity model
//!
//! One row per (project, entity kind). The three kinds move in lockstep:
//! all `running` while a run is in flight, all `success` or all `failed`
//! afterwards. `last_sync_time` is the incremental low-water mark.

use super::project::Entity as Project;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_states")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub project_id: Uuid,

    /// One of issue, comment, worklog
    pub entity_kind: String,

    /// One of idle, running, success, failed
    pub status: String,

    /// Highest timestamp below which all remote updates are known captured
    pub last_sync_time: Option<DateTimeWithTimeZone>,

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

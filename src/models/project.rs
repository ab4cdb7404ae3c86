//! Project entity model
//!
//! A project owns one sync job, three sync states, and the tracked-user list.
//! The Jira API token is stored encrypted; see `crypto` and `credentials`.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Unique identifier for the project (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Jira project key (e.g. "PROJ") used in JQL scoping
    pub key: String,

    /// Human-readable project name
    pub name: String,

    /// Base URL of the Jira site, e.g. `https://acme.atlassian.net`
    pub site_base_url: String,

    /// Email of the admin identity the API token belongs to
    pub admin_email: String,

    /// AES-256-GCM ciphertext of the Jira API token
    pub api_token_ciphertext: Vec<u8>,

    /// Default cron cadence applied when the sync job is created lazily
    pub cron_schedule: String,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tracked_user::Entity")]
    TrackedUser,
    #[sea_orm(has_many = "super::sync_state::Entity")]
    SyncState,
    #[sea_orm(has_many = "super::sync_log::Entity")]
    SyncLog,
}

impl Related<super::tracked_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackedUser.def()
    }
}

impl Related<super::sync_state::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SyncState.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

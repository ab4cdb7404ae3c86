//! JiraUser entity model
//!
//! Normalized Jira users keyed by external account id. Upserted on every
//! sighting; synthetic `anon-<id>` accounts stand in for payloads whose
//! author was stripped by anonymization or permissions.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jira_users")]
pub struct Model {
    /// External Jira account id (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: String,

    pub display_name: String,

    pub email: Option<String>,

    pub avatar_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::worklog::Entity")]
    Worklog,
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

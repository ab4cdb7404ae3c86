//! Comment entity model, keyed by the external comment id.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    /// External Jira comment id (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub issue_id: String,

    /// Author account id; synthetic `anon-<comment id>` when missing upstream
    pub author_account_id: String,

    pub body: Option<String>,

    pub remote_created_at: Option<DateTimeWithTimeZone>,

    pub remote_updated_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id"
    )]
    Issue,
    #[sea_orm(
        belongs_to = "super::jira_user::Entity",
        from = "Column::AuthorAccountId",
        to = "super::jira_user::Column::AccountId"
    )]
    Author,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl Related<super::jira_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

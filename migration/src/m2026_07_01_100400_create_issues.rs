//! Migration to create the issues table.
//!
//! Issues are keyed by the external Jira issue id and carry the full vendor
//! payload as a JSON blob next to the normalized columns.

use sea_orm_migration::prelude::*;

use crate::m2026_07_01_100000_create_projects::Projects;
use crate::m2026_07_01_100200_create_jira_users::JiraUsers;
use crate::m2026_07_01_100300_create_sprints::Sprints;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Issues::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(Issues::Key).text().not_null())
                    .col(ColumnDef::new(Issues::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Issues::AssigneeAccountId).text().null())
                    .col(ColumnDef::new(Issues::SprintId).big_integer().null())
                    .col(ColumnDef::new(Issues::Summary).text().not_null())
                    .col(ColumnDef::new(Issues::Status).text().null())
                    .col(ColumnDef::new(Issues::IssueType).text().null())
                    .col(
                        ColumnDef::new(Issues::RemoteCreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Issues::RemoteUpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Issues::Payload).json_binary().not_null())
                    .col(
                        ColumnDef::new(Issues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Issues::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issues_project_id")
                            .from(Issues::Table, Issues::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issues_assignee_account_id")
                            .from(Issues::Table, Issues::AssigneeAccountId)
                            .to(JiraUsers::Table, JiraUsers::AccountId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issues_sprint_id")
                            .from(Issues::Table, Issues::SprintId)
                            .to(Sprints::Table, Sprints::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_issues_project_updated")
                    .table(Issues::Table)
                    .col(Issues::ProjectId)
                    .col(Issues::RemoteUpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_issues_project_updated").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Issues::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Issues {
    Table,
    Id,
    Key,
    ProjectId,
    AssigneeAccountId,
    SprintId,
    Summary,
    Status,
    IssueType,
    RemoteCreatedAt,
    RemoteUpdatedAt,
    Payload,
    CreatedAt,
    UpdatedAt,
}

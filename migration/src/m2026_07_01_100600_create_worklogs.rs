//! Migration to create the worklogs table, keyed by the external worklog id.

use sea_orm_migration::prelude::*;

use crate::m2026_07_01_100200_create_jira_users::JiraUsers;
use crate::m2026_07_01_100400_create_issues::Issues;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Worklogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Worklogs::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Worklogs::IssueId).text().not_null())
                    .col(ColumnDef::new(Worklogs::AuthorAccountId).text().not_null())
                    .col(
                        ColumnDef::new(Worklogs::TimeSpentSeconds)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Worklogs::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Worklogs::Comment).text().null())
                    .col(
                        ColumnDef::new(Worklogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Worklogs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_worklogs_issue_id")
                            .from(Worklogs::Table, Worklogs::IssueId)
                            .to(Issues::Table, Issues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_worklogs_author_account_id")
                            .from(Worklogs::Table, Worklogs::AuthorAccountId)
                            .to(JiraUsers::Table, JiraUsers::AccountId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_worklogs_issue_id")
                    .table(Worklogs::Table)
                    .col(Worklogs::IssueId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_worklogs_issue_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Worklogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Worklogs {
    Table,
    Id,
    IssueId,
    AuthorAccountId,
    TimeSpentSeconds,
    StartedAt,
    Comment,
    CreatedAt,
    UpdatedAt,
}

//! Migration to create the comments table, keyed by the external comment id.

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
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comments::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comments::IssueId).text().not_null())
                    .col(ColumnDef::new(Comments::AuthorAccountId).text().not_null())
                    .col(ColumnDef::new(Comments::Body).text().null())
                    .col(
                        ColumnDef::new(Comments::RemoteCreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Comments::RemoteUpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Comments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Comments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_issue_id")
                            .from(Comments::Table, Comments::IssueId)
                            .to(Issues::Table, Issues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author_account_id")
                            .from(Comments::Table, Comments::AuthorAccountId)
                            .to(JiraUsers::Table, JiraUsers::AccountId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_issue_id")
                    .table(Comments::Table)
                    .col(Comments::IssueId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_comments_issue_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Comments {
    Table,
    Id,
    IssueId,
    AuthorAccountId,
    Body,
    RemoteCreatedAt,
    RemoteUpdatedAt,
    CreatedAt,
    UpdatedAt,
}

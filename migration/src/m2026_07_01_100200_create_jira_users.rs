//! Migration to create the jira_users table.
//!
//! Normalized Jira users keyed by their external account id. Rows are upserted
//! on every sighting (assignee, comment author, worklog author), including
//! synthetic `anon-<id>` accounts for anonymized payloads.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JiraUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JiraUsers::AccountId)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JiraUsers::DisplayName).text().not_null())
                    .col(ColumnDef::new(JiraUsers::Email).text().null())
                    .col(ColumnDef::new(JiraUsers::AvatarUrl).text().null())
                    .col(
                        ColumnDef::new(JiraUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(JiraUsers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JiraUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum JiraUsers {
    Table,
    AccountId,
    DisplayName,
    Email,
    AvatarUrl,
    CreatedAt,
    UpdatedAt,
}

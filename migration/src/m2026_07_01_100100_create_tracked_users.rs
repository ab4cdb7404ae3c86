//! Migration to create the tracked_users table.
//!
//! Tracked users are the per-project opt-in list of Jira account ids whose
//! activity the engine ingests; untracked accounts are ignored by sync runs.

use sea_orm_migration::prelude::*;

use crate::m2026_07_01_100000_create_projects::Projects;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackedUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackedUsers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TrackedUsers::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(TrackedUsers::AccountId).text().not_null())
                    .col(ColumnDef::new(TrackedUsers::DisplayName).text().null())
                    .col(
                        ColumnDef::new(TrackedUsers::IsTracked)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracked_users_project_id")
                            .from(TrackedUsers::Table, TrackedUsers::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracked_users_project_account")
                    .table(TrackedUsers::Table)
                    .col(TrackedUsers::ProjectId)
                    .col(TrackedUsers::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tracked_users_project_account")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(TrackedUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum TrackedUsers {
    Table,
    Id,
    ProjectId,
    AccountId,
    DisplayName,
    IsTracked,
    CreatedAt,
    UpdatedAt,
}

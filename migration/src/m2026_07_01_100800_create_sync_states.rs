//! Migration to create the sync_states table.
//!
//! One row per (project, entity kind); the three kinds for a project move in
//! lockstep and `last_sync_time` is the incremental low-water mark.

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
                    .table(SyncStates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncStates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncStates::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(SyncStates::EntityKind).text().not_null())
                    .col(
                        ColumnDef::new(SyncStates::Status)
                            .text()
                            .not_null()
                            .default("idle"),
                    )
                    .col(
                        ColumnDef::new(SyncStates::LastSyncTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SyncStates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SyncStates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sync_states_project_id")
                            .from(SyncStates::Table, SyncStates::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_states_project_kind")
                    .table(SyncStates::Table)
                    .col(SyncStates::ProjectId)
                    .col(SyncStates::EntityKind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_sync_states_project_kind").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SyncStates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SyncStates {
    Table,
    Id,
    ProjectId,
    EntityKind,
    Status,
    LastSyncTime,
    CreatedAt,
    UpdatedAt,
}

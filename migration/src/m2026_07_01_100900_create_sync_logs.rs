//! Migration to create the append-only sync_logs audit table.

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
                    .table(SyncLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncLogs::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(SyncLogs::Level).text().not_null())
                    .col(ColumnDef::new(SyncLogs::Message).text().not_null())
                    .col(ColumnDef::new(SyncLogs::Details).json_binary().null())
                    .col(
                        ColumnDef::new(SyncLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sync_logs_project_id")
                            .from(SyncLogs::Table, SyncLogs::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_logs_project_created")
                    .table(SyncLogs::Table)
                    .col(SyncLogs::ProjectId)
                    .col(SyncLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_sync_logs_project_created").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SyncLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SyncLogs {
    Table,
    Id,
    ProjectId,
    Level,
    Message,
    Details,
    CreatedAt,
}

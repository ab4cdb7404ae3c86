//! Migration to create the sync_jobs table.
//!
//! One row per project: schedule identity, run status, and the durable
//! in-flight page cursor the run loop persists after every batch.

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
                    .table(SyncJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncJobs::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(SyncJobs::WorkflowId).text().not_null())
                    .col(ColumnDef::new(SyncJobs::ScheduleId).text().not_null())
                    .col(ColumnDef::new(SyncJobs::CronSchedule).text().not_null())
                    .col(
                        ColumnDef::new(SyncJobs::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(SyncJobs::LastRunAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SyncJobs::NextRunAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(SyncJobs::Cursor).json_binary().null())
                    .col(
                        ColumnDef::new(SyncJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SyncJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sync_jobs_project_id")
                            .from(SyncJobs::Table, SyncJobs::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_jobs_project_id")
                    .table(SyncJobs::Table)
                    .col(SyncJobs::ProjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_sync_jobs_project_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SyncJobs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SyncJobs {
    Table,
    Id,
    ProjectId,
    WorkflowId,
    ScheduleId,
    CronSchedule,
    Status,
    LastRunAt,
    NextRunAt,
    Cursor,
    CreatedAt,
    UpdatedAt,
}

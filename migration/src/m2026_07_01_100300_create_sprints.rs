//! Migration to create the sprints table, keyed by the external sprint id.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sprints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sprints::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sprints::Name).text().not_null())
                    .col(ColumnDef::new(Sprints::State).text().null())
                    .col(ColumnDef::new(Sprints::BoardId).big_integer().null())
                    .col(
                        ColumnDef::new(Sprints::StartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Sprints::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Sprints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Sprints::UpdatedAt)
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
            .drop_table(Table::drop().table(Sprints::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Sprints {
    Table,
    Id,
    Name,
    State,
    BoardId,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

//! Database migrations for the issuesync engine.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2026_07_01_100000_create_projects;
mod m2026_07_01_100100_create_tracked_users;
mod m2026_07_01_100200_create_jira_users;
mod m2026_07_01_100300_create_sprints;
mod m2026_07_01_100400_create_issues;
mod m2026_07_01_100500_create_comments;
mod m2026_07_01_100600_create_worklogs;
mod m2026_07_01_100700_create_sync_jobs;
mod m2026_07_01_100800_create_sync_states;
mod m2026_07_01_100900_create_sync_logs;

pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_07_01_100000_create_projects::Migration),
            Box::new(m2026_07_01_100100_create_tracked_users::Migration),
            Box::new(m2026_07_01_100200_create_jira_users::Migration),
            Box::new(m2026_07_01_100300_create_sprints::Migration),
            Box::new(m2026_07_01_100400_create_issues::Migration),
            Box::new(m2026_07_01_100500_create_comments::Migration),
            Box::new(m2026_07_01_100600_create_worklogs::Migration),
            Box::new(m2026_07_01_100700_create_sync_jobs::Migration),
            Box::new(m2026_07_01_100800_create_sync_states::Migration),
            Box::new(m2026_07_01_100900_create_sync_logs::Migration),
        ]
    }
}

//! Shared fixtures for integration tests: in-memory SQLite with migrations
//! applied, plus project and tracked-user seed helpers.

use anyhow::Result;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set, Statement};
use uuid::Uuid;

use issuesync::models::{project, tracked_user};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;

    // SQLite does not enforce our Postgres foreign key semantics; disable FK
    // checks so fixtures can be inserted without the full relation graph.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Inserts a project pointed at `base_url` and returns its id.
#[allow(dead_code)]
pub async fn create_test_project(db: &DatabaseConnection, base_url: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now().fixed_offset();
    project::ActiveModel {
        id: Set(id),
        key: Set("PROJ".to_string()),
        name: Set("Test Project".to_string()),
        site_base_url: Set(base_url.to_string()),
        admin_email: Set("admin@example.com".to_string()),
        api_token_ciphertext: Set(b"test-token".to_vec()),
        cron_schedule: Set("0 */6 * * *".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(id)
}

/// Adds a tracked account to a project.
#[allow(dead_code)]
pub async fn create_tracked_user(
    db: &DatabaseConnection,
    project_id: Uuid,
    account_id: &str,
) -> Result<()> {
    let now = Utc::now().fixed_offset();
    tracked_user::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project_id),
        account_id: Set(account_id.to_string()),
        display_name: Set(Some(format!("User {}", account_id))),
        is_tracked: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(())
}

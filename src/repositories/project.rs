//! Repository for projects and their tracked-user lists.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{project, tracked_user};

pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<project::Model>, EngineError> {
        Ok(project::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Account ids of users currently marked as tracked for the project.
    pub async fn tracked_account_ids(&self, project_id: Uuid) -> Result<Vec<String>, EngineError> {
        let users = tracked_user::Entity::find()
            .filter(tracked_user::Column::ProjectId.eq(project_id))
            .filter(tracked_user::Column::IsTracked.eq(true))
            .all(&self.db)
            .await?;
        Ok(users.into_iter().map(|u| u.account_id).collect())
    }
}

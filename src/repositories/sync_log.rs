//! Repository for the per-project sync audit trail.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::sync_log::{ActiveModel, Column, Entity, Model};
use crate::models::LogLevel;

pub struct SyncLogRepository {
    db: DatabaseConnection,
}

impl SyncLogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn append(
        &self,
        project_id: Uuid,
        level: LogLevel,
        message: &str,
        details: Option<JsonValue>,
    ) -> Result<Model, EngineError> {
        let entry = ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            level: Set(level.as_str().to_string()),
            message: Set(message.to_string()),
            details: Set(details),
            created_at: Set(Utc::now().fixed_offset()),
        };
        Ok(entry.insert(&self.db).await?)
    }

    /// Most recent entries first.
    pub async fn recent(&self, project_id: Uuid, limit: u64) -> Result<Vec<Model>, EngineError> {
        Ok(Entity::find()
            .filter(Column::ProjectId.eq(project_id))
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?)
    }
}

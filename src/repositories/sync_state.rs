//! Repository for per-entity-kind sync state rows.
//!
//! Every project has exactly one state row per entity kind (issue, comment,
//! worklog). The rows move through run statuses in lockstep; a batch never
//! advances one kind while another lags.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::sync_state::{ActiveModel, Column, Entity, Model};
use crate::models::{EntityKind, RunStatus};

pub struct SyncStateRepository {
    db: DatabaseConnection,
}

impl SyncStateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_all(&self, project_id: Uuid) -> Result<Vec<Model>, EngineError> {
        Ok(Entity::find()
            .filter(Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await?)
    }

    /// Creates any missing state rows as IDLE. Idempotent.
    pub async fn ensure_states(&self, project_id: Uuid) -> Result<Vec<Model>, EngineError> {
        let existing = self.find_all(project_id).await?;
        let now = Utc::now().fixed_offset();

        for kind in EntityKind::ALL {
            if existing.iter().any(|s| s.entity_kind == kind.as_str()) {
                continue;
            }
            ActiveModel {
                id: Set(Uuid::new_v4()),
                project_id: Set(project_id),
                entity_kind: Set(kind.as_str().to_string()),
                status: Set(RunStatus::Idle.as_str().to_string()),
                last_sync_time: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&self.db)
            .await?;
        }

        self.find_all(project_id).await
    }

    /// Conservative incremental cursor: the minimum last sync time across
    /// all entity kinds, or `None` (full window) when any kind has never
    /// completed a sync.
    pub async fn min_last_sync_time(
        &self,
        project_id: Uuid,
    ) -> Result<Option<DateTimeWithTimeZone>, EngineError> {
        let states = self.find_all(project_id).await?;
        if states.len() < EntityKind::ALL.len() {
            return Ok(None);
        }
        let mut min: Option<DateTimeWithTimeZone> = None;
        for state in &states {
            match state.last_sync_time {
                None => return Ok(None),
                Some(ts) => {
                    min = Some(match min {
                        Some(current) if current <= ts => current,
                        _ => ts,
                    });
                }
            }
        }
        Ok(min)
    }

    /// Moves every state row to `status` in lockstep.
    pub async fn mark_all(&self, project_id: Uuid, status: RunStatus) -> Result<(), EngineError> {
        let now = Utc::now().fixed_offset();
        for state in self.find_all(project_id).await? {
            let mut active: ActiveModel = state.into();
            active.status = Set(status.as_str().to_string());
            active.updated_at = Set(now);
            active.update(&self.db).await?;
        }
        Ok(())
    }

    /// Terminal lockstep transition. `last_sync_time` is stamped only on a
    /// successful run; failures leave the previous watermark intact.
    pub async fn finalize_all(
        &self,
        project_id: Uuid,
        status: RunStatus,
        last_sync_time: Option<DateTimeWithTimeZone>,
    ) -> Result<(), EngineError> {
        let now = Utc::now().fixed_offset();
        for state in self.find_all(project_id).await? {
            let mut active: ActiveModel = state.into();
            active.status = Set(status.as_str().to_string());
            if status == RunStatus::Success {
                if let Some(ts) = last_sync_time {
                    active.last_sync_time = Set(Some(ts));
                }
            }
            active.updated_at = Set(now);
            active.update(&self.db).await?;
        }
        Ok(())
    }
}

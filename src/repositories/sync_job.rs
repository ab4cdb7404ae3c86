//! Repository for the per-project sync job row.
//!
//! Each project has at most one job. The job carries the schedule identity
//! and the persisted batch cursor that lets an interrupted run resume.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::sync_job::{ActiveModel, Column, Entity, Model};
use crate::models::{project, JobStatus};

/// Derives the stable workflow identity for a project's sync runs.
pub fn workflow_id(project_id: Uuid) -> String {
    format!("issue-sync-{}", project_id)
}

/// Derives the stable schedule identity for a project's sync cadence.
pub fn schedule_id(project_id: Uuid) -> String {
    format!("issue-sync-schedule-{}", project_id)
}

pub struct SyncJobRepository {
    db: DatabaseConnection,
}

impl SyncJobRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_job_id(&self, job_id: Uuid) -> Result<Option<Model>, EngineError> {
        Ok(Entity::find_by_id(job_id).one(&self.db).await?)
    }

    pub async fn find_by_project(&self, project_id: Uuid) -> Result<Option<Model>, EngineError> {
        Ok(Entity::find()
            .filter(Column::ProjectId.eq(project_id))
            .one(&self.db)
            .await?)
    }

    /// Returns the project's job, creating it lazily on first sync with the
    /// project's cron cadence and derived workflow/schedule ids.
    pub async fn ensure_job(&self, project: &project::Model) -> Result<Model, EngineError> {
        if let Some(existing) = self.find_by_project(project.id).await? {
            return Ok(existing);
        }

        let now = Utc::now().fixed_offset();
        let job = ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project.id),
            workflow_id: Set(workflow_id(project.id)),
            schedule_id: Set(schedule_id(project.id)),
            cron_schedule: Set(project.cron_schedule.clone()),
            status: Set(JobStatus::Pending.as_str().to_string()),
            last_run_at: Set(None),
            next_run_at: Set(None),
            cursor: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(job.insert(&self.db).await?)
    }

    pub async fn set_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
        last_run_at: Option<DateTimeWithTimeZone>,
    ) -> Result<(), EngineError> {
        let job = Entity::find_by_id(job_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| EngineError::State(format!("sync job {} not found", job_id)))?;

        let mut active: ActiveModel = job.into();
        active.status = Set(status.as_str().to_string());
        if let Some(ts) = last_run_at {
            active.last_run_at = Set(Some(ts));
        }
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(&self.db).await?;
        Ok(())
    }

    /// Stores (or clears) the in-flight batch cursor. Written after every
    /// page so a crashed run resumes instead of restarting.
    pub async fn save_cursor(
        &self,
        job_id: Uuid,
        cursor: Option<JsonValue>,
    ) -> Result<(), EngineError> {
        let job = Entity::find_by_id(job_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| EngineError::State(format!("sync job {} not found", job_id)))?;

        let mut active: ActiveModel = job.into();
        active.cursor = Set(cursor);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(&self.db).await?;
        Ok(())
    }
}

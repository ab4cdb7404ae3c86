//! Drives a full sync run for one project.
//!
//! The runner strings the activities together and persists the batch cursor
//! on the job row after every page. A process crash mid-run therefore
//! resumes from the last persisted page instead of refetching the whole
//! window.

use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::activities::{Activities, BatchCursor};
use crate::error::EngineError;
use crate::repositories::SyncJobRepository;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub issues_processed: u64,
    pub batches: u64,
}

pub struct SyncRunner {
    activities: Activities,
    jobs: SyncJobRepository,
}

impl SyncRunner {
    pub fn new(activities: Activities, jobs: SyncJobRepository) -> Self {
        Self { activities, jobs }
    }

    /// Runs a complete sync for the project: prepare, batches until the
    /// search is drained, then finalize. Failures flip the run to FAILED
    /// without advancing any watermark.
    #[instrument(skip(self, account_override), fields(project_id = %project_id))]
    pub async fn run_project(
        &self,
        project_id: Uuid,
        full_resync: bool,
        account_override: Option<&[String]>,
    ) -> Result<RunSummary, EngineError> {
        let ctx = self
            .activities
            .prepare(project_id, full_resync, account_override)
            .await?;

        let mut cursor = if full_resync {
            self.jobs.save_cursor(ctx.job_id, None).await?;
            BatchCursor::default()
        } else {
            self.resume_cursor(ctx.job_id, ctx.since).await?
        };

        let mut summary = RunSummary {
            issues_processed: 0,
            batches: 0,
        };

        loop {
            let outcome = match self.activities.run_batch(&ctx, &cursor).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    self.activities.fail(&ctx, &err).await?;
                    self.jobs.save_cursor(ctx.job_id, None).await?;
                    return Err(err);
                }
            };

            summary.issues_processed += outcome.issues_processed;
            summary.batches += 1;
            cursor = outcome.cursor;

            if outcome.has_more {
                let value = serde_json::to_value(&cursor)
                    .map_err(|e| EngineError::State(format!("cursor serialization: {}", e)))?;
                self.jobs.save_cursor(ctx.job_id, Some(value)).await?;
            } else {
                break;
            }
        }

        self.activities
            .finalize(&ctx, &cursor, summary.issues_processed)
            .await?;
        self.jobs.save_cursor(ctx.job_id, None).await?;

        info!(
            issues = summary.issues_processed,
            batches = summary.batches,
            "sync run finished"
        );
        Ok(summary)
    }

    /// Loads the persisted batch cursor, if an interrupted run left one.
    ///
    /// A page token is only valid for the query it was issued under, so a
    /// cursor persisted against a different incremental window is dropped
    /// and the run starts from the first page.
    async fn resume_cursor(
        &self,
        job_id: Uuid,
        since: Option<DateTimeWithTimeZone>,
    ) -> Result<BatchCursor, EngineError> {
        let job = self
            .jobs
            .find_by_job_id(job_id)
            .await?
            .ok_or_else(|| EngineError::State(format!("sync job {} not found", job_id)))?;

        match job.cursor {
            Some(value) => match serde_json::from_value::<BatchCursor>(value) {
                Ok(cursor) => {
                    if cursor.next_page_token.is_some() && cursor.since != since {
                        warn!(
                            cursor_since = ?cursor.since,
                            run_since = ?since,
                            "discarding cursor persisted against a different window"
                        );
                        return Ok(BatchCursor::default());
                    }
                    info!(
                        page_token = ?cursor.next_page_token,
                        "resuming from persisted cursor"
                    );
                    Ok(cursor)
                }
                Err(e) => {
                    warn!(error = %e, "discarding unreadable persisted cursor");
                    Ok(BatchCursor::default())
                }
            },
            None => Ok(BatchCursor::default()),
        }
    }
}

//! Sync run activities: prepare, run one batch, finalize, fail.
//!
//! The activities are side-effect units a driver composes into a full run.
//! Each one is independently re-runnable; `run_batch` in particular can be
//! replayed against the same cursor without duplicating rows because the
//! persistence layer upserts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::credentials::{CredentialResolver, SiteCredentials};
use crate::error::EngineError;
use crate::jira::{build_jql, IssueDetailOptions, JiraClient};
use crate::models::{JobStatus, LogLevel, RunStatus};
use crate::repositories::{
    ProjectRepository, SyncJobRepository, SyncLogRepository, SyncStateRepository,
};
use crate::retry::RetryPolicy;
use crate::upsert::upsert_issue_detail;

/// Everything a batch needs, resolved once per run by `prepare`.
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub project_id: Uuid,
    pub project_key: String,
    pub job_id: Uuid,
    /// Accounts the JQL is scoped to. Empty means nothing to sync.
    pub account_ids: Vec<String>,
    /// Incremental window start; `None` requests the full history.
    pub since: Option<DateTimeWithTimeZone>,
    /// Wall-clock start of the run; the fallback watermark for empty runs.
    pub started_at: DateTimeWithTimeZone,
    pub credentials: SiteCredentials,
}

/// Resume point persisted between batches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchCursor {
    /// Opaque search page token; `None` means start from the first page.
    pub next_page_token: Option<String>,
    /// Highest remote `updated` seen so far in this run.
    pub last_updated_at: Option<DateTimeWithTimeZone>,
    /// Window start the page token was issued under. Jira tokens are bound
    /// to their query, so a token is only replayable against the same
    /// window.
    pub since: Option<DateTimeWithTimeZone>,
}

/// Result of one `run_batch` call.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub has_more: bool,
    pub cursor: BatchCursor,
    pub issues_processed: u64,
}

pub struct Activities {
    db: DatabaseConnection,
    resolver: Arc<dyn CredentialResolver>,
    retry: RetryPolicy,
    page_size: u64,
}

impl Activities {
    pub fn new(
        db: DatabaseConnection,
        resolver: Arc<dyn CredentialResolver>,
        retry: RetryPolicy,
        page_size: u64,
    ) -> Self {
        Self {
            db,
            resolver,
            retry,
            page_size,
        }
    }

    fn projects(&self) -> ProjectRepository {
        ProjectRepository::new(self.db.clone())
    }

    fn jobs(&self) -> SyncJobRepository {
        SyncJobRepository::new(self.db.clone())
    }

    fn states(&self) -> SyncStateRepository {
        SyncStateRepository::new(self.db.clone())
    }

    fn logs(&self) -> SyncLogRepository {
        SyncLogRepository::new(self.db.clone())
    }

    /// Sets up a run: ensures the job and state rows exist, computes the
    /// incremental window, flips statuses to running, and resolves
    /// credentials.
    ///
    /// `account_override` narrows the run to specific accounts; `None` means
    /// the project's tracked-user list applies.
    #[instrument(skip(self, account_override), fields(project_id = %project_id))]
    pub async fn prepare(
        &self,
        project_id: Uuid,
        full_resync: bool,
        account_override: Option<&[String]>,
    ) -> Result<BatchContext, EngineError> {
        let project = self
            .projects()
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| EngineError::State(format!("project {} not found", project_id)))?;

        let account_ids = match account_override {
            Some(accounts) => accounts.to_vec(),
            None => self.projects().tracked_account_ids(project_id).await?,
        };

        let job = self.jobs().ensure_job(&project).await?;
        self.states().ensure_states(project_id).await?;

        let since = if full_resync {
            None
        } else {
            self.states().min_last_sync_time(project_id).await?
        };

        self.states().mark_all(project_id, RunStatus::Running).await?;
        self.jobs()
            .set_status(job.id, JobStatus::Active, None)
            .await?;

        let credentials = self.resolver.resolve(&project).await?;

        info!(
            project_key = %project.key,
            accounts = account_ids.len(),
            full_resync,
            since = ?since,
            "sync run prepared"
        );
        self.logs()
            .append(
                project_id,
                LogLevel::Info,
                "sync run started",
                Some(json!({
                    "accounts": account_ids.len(),
                    "full_resync": full_resync,
                    "since": since.map(|t| t.to_rfc3339()),
                })),
            )
            .await?;

        Ok(BatchContext {
            project_id,
            project_key: project.key,
            job_id: job.id,
            account_ids,
            since,
            started_at: Utc::now().fixed_offset(),
            credentials,
        })
    }

    /// Fetches and persists one search page.
    ///
    /// Every issue is hydrated (detail, comments, worklogs) and written in
    /// its own transaction, so a failure partway through a page loses at
    /// most the in-flight issue.
    #[instrument(skip(self, ctx, cursor), fields(project_id = %ctx.project_id))]
    pub async fn run_batch(
        &self,
        ctx: &BatchContext,
        cursor: &BatchCursor,
    ) -> Result<BatchOutcome, EngineError> {
        if ctx.account_ids.is_empty() {
            info!("no tracked accounts, nothing to sync");
            self.logs()
                .append(
                    ctx.project_id,
                    LogLevel::Info,
                    "no tracked accounts, skipping batch",
                    None,
                )
                .await?;
            return Ok(BatchOutcome {
                has_more: false,
                cursor: cursor.clone(),
                issues_processed: 0,
            });
        }

        let client = JiraClient::new(&ctx.credentials, self.page_size)?;
        let since = ctx
            .since
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH);
        let jql = build_jql(&ctx.project_key, &ctx.account_ids, since);

        let page = self
            .retry
            .run("search", || {
                client.search(&jql, cursor.next_page_token.as_deref())
            })
            .await?;

        let mut high_water = cursor.last_updated_at;
        let mut issues_processed: u64 = 0;

        for issue in &page.issues {
            let issue_key = issue
                .get("key")
                .and_then(|v| v.as_str())
                .ok_or_else(|| EngineError::State("search result missing issue key".to_string()))?
                .to_string();

            let detail = self
                .retry
                .run("issue_detail", || {
                    client.fetch_issue_detail(&issue_key, IssueDetailOptions::default())
                })
                .await?;

            let txn = self.db.begin().await?;
            let remote_updated = upsert_issue_detail(&txn, ctx.project_id, &detail).await?;
            txn.commit().await?;

            if let Some(ts) = remote_updated {
                high_water = Some(match high_water {
                    Some(current) if current >= ts => current,
                    _ => ts,
                });
            }
            issues_processed += 1;
            counter!("issues_synced_total").increment(1);
        }

        let outcome = BatchOutcome {
            has_more: page.has_more(),
            cursor: BatchCursor {
                next_page_token: page.next_page_token.clone(),
                last_updated_at: high_water,
                since: ctx.since,
            },
            issues_processed,
        };

        info!(
            issues = issues_processed,
            has_more = outcome.has_more,
            total = ?page.total,
            "batch completed"
        );
        self.logs()
            .append(
                ctx.project_id,
                LogLevel::Info,
                "batch completed",
                Some(json!({
                    "issues": issues_processed,
                    "has_more": outcome.has_more,
                })),
            )
            .await?;

        Ok(outcome)
    }

    /// Marks a successful run: state rows flip to SUCCESS in lockstep and
    /// all three watermarks advance to the run's issue-derived high-water
    /// mark. An empty run stamps the run's start time instead, since the
    /// search proved nothing changed before that point.
    #[instrument(skip(self, ctx, cursor), fields(project_id = %ctx.project_id))]
    pub async fn finalize(
        &self,
        ctx: &BatchContext,
        cursor: &BatchCursor,
        issues_processed: u64,
    ) -> Result<(), EngineError> {
        let now = Utc::now().fixed_offset();
        let watermark = cursor.last_updated_at.unwrap_or(ctx.started_at);
        self.states()
            .finalize_all(ctx.project_id, RunStatus::Success, Some(watermark))
            .await?;
        self.jobs()
            .set_status(ctx.job_id, JobStatus::Active, Some(now))
            .await?;

        info!(issues = issues_processed, "sync run finalized");
        self.logs()
            .append(
                ctx.project_id,
                LogLevel::Info,
                "sync run completed",
                Some(json!({ "issues": issues_processed })),
            )
            .await?;
        counter!("sync_runs_total", "outcome" => "success").increment(1);
        Ok(())
    }

    /// Marks a failed run: state rows flip to FAILED in lockstep, watermarks
    /// stay where the last successful run left them, and the failure is
    /// recorded on the audit trail.
    #[instrument(skip(self, ctx, err), fields(project_id = %ctx.project_id))]
    pub async fn fail(&self, ctx: &BatchContext, err: &EngineError) -> Result<(), EngineError> {
        let now = Utc::now().fixed_offset();
        self.states()
            .finalize_all(ctx.project_id, RunStatus::Failed, None)
            .await?;
        self.jobs()
            .set_status(ctx.job_id, JobStatus::Error, Some(now))
            .await?;

        error!(error = %err, "sync run failed");
        let details = match err {
            EngineError::Remote(remote) => json!({
                "code": remote.classification.code.as_str(),
                "status": remote.classification.status,
                "message": remote.classification.message,
            }),
            other => json!({ "message": other.to_string() }),
        };
        self.logs()
            .append(
                ctx.project_id,
                LogLevel::Error,
                "sync run failed",
                Some(details),
            )
            .await?;
        counter!("sync_runs_total", "outcome" => "failure").increment(1);
        Ok(())
    }
}

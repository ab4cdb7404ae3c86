//! Command-line entry point for the issue sync engine.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use issuesync::activities::Activities;
use issuesync::config::ConfigLoader;
use issuesync::credentials::EncryptedTokenResolver;
use issuesync::crypto::CryptoKey;
use issuesync::db::init_pool;
use issuesync::init_subscriber;
use issuesync::repositories::SyncJobRepository;
use issuesync::retry::RetryPolicy;
use issuesync::runner::SyncRunner;

#[derive(Parser)]
#[command(name = "issuesync", about = "Incremental Jira issue sync engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Run a full sync for one project.
    Sync {
        /// Project id to sync.
        #[arg(long)]
        project: Uuid,
        /// Ignore stored watermarks and refetch the full history.
        #[arg(long)]
        full_resync: bool,
        /// Restrict the run to specific account ids (repeatable).
        #[arg(long = "account")]
        accounts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new().load().context("loading configuration")?;
    init_subscriber(&config);
    if let Ok(redacted) = config.redacted_json() {
        tracing::info!(config = %redacted, "configuration loaded");
    }

    let db = init_pool(&config).await?;

    match cli.command {
        Command::Migrate => {
            migration::Migrator::up(&db, None)
                .await
                .context("running migrations")?;
            tracing::info!("migrations applied");
        }
        Command::Sync {
            project,
            full_resync,
            accounts,
        } => {
            if config.crypto_key.is_empty() {
                bail!("ISSUESYNC_CRYPTO_KEY must be set to decrypt project credentials");
            }
            let key = CryptoKey::new(config.crypto_key.clone())?;
            let resolver = Arc::new(EncryptedTokenResolver::new(key));

            let activities = Activities::new(
                db.clone(),
                resolver,
                RetryPolicy::from(&config.retry),
                config.page_size,
            );
            let runner = SyncRunner::new(activities, SyncJobRepository::new(db));

            let override_accounts = if accounts.is_empty() {
                None
            } else {
                Some(accounts.as_slice())
            };
            let summary = runner
                .run_project(project, full_resync, override_accounts)
                .await?;
            tracing::info!(
                issues = summary.issues_processed,
                batches = summary.batches,
                "sync completed"
            );
        }
    }

    Ok(())
}

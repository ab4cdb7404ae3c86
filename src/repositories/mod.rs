//! Repository layer encapsulating SeaORM access per table.

pub mod project;
pub mod sync_job;
pub mod sync_log;
pub mod sync_state;

pub use project::ProjectRepository;
pub use sync_job::SyncJobRepository;
pub use sync_log::SyncLogRepository;
pub use sync_state::SyncStateRepository;

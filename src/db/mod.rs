mod schema;
pub mod jobs;
pub mod sqlite;

use anyhow::Result;

pub use jobs::{JobPatch, JobStatus, JobTransitionError, StagingAsset, StagingJob};
pub use schema::SCHEMA;
pub use sqlite::Database;

/// Persistent record of staging jobs and their accepted outputs.
///
/// Each call is its own small write; there are no multi-row transactions,
/// so readers may observe a job between two updates.
pub trait JobStore: Send + Sync {
    fn create_job(&self, job: &StagingJob) -> Result<()>;

    fn get_job(&self, id: &str) -> Result<Option<StagingJob>>;

    /// Jobs of one batch, in submission order.
    fn jobs_for_batch(&self, batch_id: &str) -> Result<Vec<StagingJob>>;

    /// Apply `patch` and return the updated job. Fails for unknown ids and
    /// for status changes out of a terminal state.
    fn update_job(&self, id: &str, patch: &JobPatch) -> Result<StagingJob>;

    fn create_asset(&self, asset: &StagingAsset) -> Result<()>;

    fn asset_for_job(&self, job_id: &str) -> Result<Option<StagingAsset>>;
}

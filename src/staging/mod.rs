//! Virtual staging pipeline: prompt building, quality gating, the job
//! queue and batch submission.

pub mod assets;
pub mod batch;
pub mod prompt;
pub mod quality;
pub mod queue;

use thiserror::Error;

pub use assets::AssetWriter;
pub use batch::{BatchReceipt, BatchRequest, BatchStatus, JobStatusView, StagingService};
pub use prompt::{
    build_staging_prompt, escalate_negative_prompt, InvalidRoomType, RoomType, StagingPrompt, Strictness,
    ESCALATION_CLAUSE, HARD_CONSTRAINT_BLOCK,
};
pub use quality::{assess_output_metadata_if_available, assess_prompt_for_banned_terms};
pub use queue::{QueueSettings, StagingQueue};

/// Why a batch submission was rejected. Validation errors are raised
/// before any job exists.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("invalid request JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidRoomType(#[from] InvalidRoomType),

    #[error(transparent)]
    UnknownVibe(#[from] crate::vibes::UnknownVibe),

    #[error("no vibes selected")]
    NoVibesSelected,

    #[error("input image is required")]
    MissingInputImage,

    #[error("failed to store staging job: {0}")]
    Storage(anyhow::Error),
}

//! Staging job and asset records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::staging::{RoomType, Strictness};
use crate::vibes::Vibe;

/// Lifecycle of a staging job: queued, then running, then one of the
/// three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
    Flagged,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Flagged => "flagged",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "done" => Some(JobStatus::Done),
            "failed" => Some(JobStatus::Failed),
            "flagged" => Some(JobStatus::Flagged),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed | JobStatus::Flagged)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (room image, vibe, room type) generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingJob {
    pub id: String,
    pub batch_id: String,
    pub vibe: Vibe,
    pub room_type: RoomType,
    pub room_notes: Option<String>,
    pub input_image: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub strictness: Strictness,
    pub status: JobStatus,
    pub output_image_url: Option<String>,
    pub quality_flags: Vec<String>,
    pub error: Option<String>,
    /// Provider calls made so far, counting the escalated retry.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Accepted output of a job that finished `done`.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingAsset {
    pub id: String,
    pub job_id: String,
    pub batch_id: String,
    pub vibe: Vibe,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobTransitionError {
    #[error("job {id} is already {status} and cannot move to {requested}")]
    AlreadyTerminal {
        id: String,
        status: JobStatus,
        requested: JobStatus,
    },
}

/// Partial update of a job. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub negative_prompt: Option<String>,
    pub output_image_url: Option<String>,
    pub quality_flags: Option<Vec<String>>,
    pub error: Option<String>,
    pub attempts: Option<u32>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Apply to `job` at time `now`.
    ///
    /// Always bumps `updated_at`. Entering `running` stamps `started_at`,
    /// entering a terminal state stamps `completed_at`. A terminal job
    /// refuses any status change.
    pub fn apply_to(&self, job: &mut StagingJob, now: DateTime<Utc>) -> Result<(), JobTransitionError> {
        if let Some(next) = self.status {
            if job.status.is_terminal() && next != job.status {
                return Err(JobTransitionError::AlreadyTerminal {
                    id: job.id.clone(),
                    status: job.status,
                    requested: next,
                });
            }
            if next == JobStatus::Running && job.started_at.is_none() {
                job.started_at = Some(now);
            }
            if next.is_terminal() && job.completed_at.is_none() {
                job.completed_at = Some(now);
            }
            job.status = next;
        }
        if let Some(ref negative) = self.negative_prompt {
            job.negative_prompt = negative.clone();
        }
        if let Some(ref url) = self.output_image_url {
            job.output_image_url = Some(url.clone());
        }
        if let Some(ref flags) = self.quality_flags {
            job.quality_flags = flags.clone();
        }
        if let Some(ref error) = self.error {
            job.error = Some(error.clone());
        }
        if let Some(attempts) = self.attempts {
            job.attempts = attempts;
        }
        job.updated_at = now;
        Ok(())
    }
}

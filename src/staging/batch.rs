//! Batch submission and status polling.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::prompt::{build_staging_prompt, RoomType, Strictness};
use super::queue::StagingQueue;
use super::SubmissionError;
use crate::db::{JobStatus, JobStore, StagingJob};
use crate::vibes::Vibe;

/// One upload to stage in several vibes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub input_image: String,
    pub room_type: String,
    pub selected_vibes: Vec<String>,
    #[serde(default)]
    pub strictness: Strictness,
    #[serde(default)]
    pub room_notes: Option<String>,
}

impl BatchRequest {
    pub fn from_json(json: &str) -> Result<Self, SubmissionError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptJob {
    pub job_id: String,
    pub vibe_id: Vibe,
    pub status: JobStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReceipt {
    pub batch_id: String,
    pub jobs: Vec<ReceiptJob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub job_id: String,
    pub vibe_id: Vibe,
    pub status: JobStatus,
    pub output_image_url: Option<String>,
    pub quality_flags: Vec<String>,
    pub error: Option<String>,
}

impl From<&StagingJob> for JobStatusView {
    fn from(job: &StagingJob) -> Self {
        Self {
            job_id: job.id.clone(),
            vibe_id: job.vibe,
            status: job.status,
            output_image_url: job.output_image_url.clone(),
            quality_flags: job.quality_flags.clone(),
            error: job.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatus {
    pub batch_id: String,
    pub jobs: Vec<JobStatusView>,
}

impl BatchStatus {
    pub fn is_complete(&self) -> bool {
        self.jobs.iter().all(|j| j.status.is_terminal())
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }
}

/// Entry point for callers: validates submissions, creates one job per
/// vibe and answers status queries.
pub struct StagingService {
    store: Arc<dyn JobStore>,
    queue: Arc<StagingQueue>,
}

impl StagingService {
    pub fn new(store: Arc<dyn JobStore>, queue: Arc<StagingQueue>) -> Self {
        Self { store, queue }
    }

    pub fn queue(&self) -> &StagingQueue {
        &self.queue
    }

    pub fn submit_json(&self, json: &str) -> Result<BatchReceipt, SubmissionError> {
        self.submit_batch(BatchRequest::from_json(json)?)
    }

    /// Validate the whole request, then create and enqueue one job per
    /// distinct vibe. Returns as soon as the jobs are queued.
    ///
    /// A store failure part-way through leaves the already-queued jobs in
    /// place and reports [`SubmissionError::Storage`].
    pub fn submit_batch(&self, request: BatchRequest) -> Result<BatchReceipt, SubmissionError> {
        if request.input_image.trim().is_empty() {
            return Err(SubmissionError::MissingInputImage);
        }
        let room_type = RoomType::parse(&request.room_type)?;
        if request.selected_vibes.is_empty() {
            return Err(SubmissionError::NoVibesSelected);
        }

        let mut vibes: Vec<Vibe> = Vec::with_capacity(request.selected_vibes.len());
        for name in &request.selected_vibes {
            let vibe = Vibe::from_name(name)?;
            if !vibes.contains(&vibe) {
                vibes.push(vibe);
            }
        }

        let batch_id = uuid::Uuid::new_v4().to_string();
        let notes = request
            .room_notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let mut jobs = Vec::with_capacity(vibes.len());

        for vibe in vibes {
            let built = build_staging_prompt(vibe.as_str(), room_type, notes, request.strictness);
            let now = Utc::now();
            let job = StagingJob {
                id: uuid::Uuid::new_v4().to_string(),
                batch_id: batch_id.clone(),
                vibe: built.vibe,
                room_type,
                room_notes: notes.map(str::to_string),
                input_image: request.input_image.clone(),
                prompt: built.prompt,
                negative_prompt: built.negative_prompt,
                strictness: request.strictness,
                status: JobStatus::Queued,
                output_image_url: None,
                quality_flags: Vec::new(),
                error: None,
                attempts: 0,
                created_at: now,
                updated_at: now,
                started_at: None,
                completed_at: None,
            };
            let job_id = job.id.clone();
            self.queue.enqueue(job).map_err(SubmissionError::Storage)?;
            jobs.push(ReceiptJob {
                job_id,
                vibe_id: vibe,
                status: JobStatus::Queued,
            });
        }

        tracing::info!(batch_id = %batch_id, jobs = jobs.len(), room_type = %room_type, "Staging batch submitted");
        Ok(BatchReceipt { batch_id, jobs })
    }

    /// Persisted view of every job in a batch, or `None` for an unknown id.
    pub fn batch_status(&self, batch_id: &str) -> Result<Option<BatchStatus>> {
        let jobs = self.store.jobs_for_batch(batch_id)?;
        if jobs.is_empty() {
            return Ok(None);
        }
        Ok(Some(BatchStatus {
            batch_id: batch_id.to_string(),
            jobs: jobs.iter().map(JobStatusView::from).collect(),
        }))
    }

    /// Job status from the queue's in-memory table, else from the store.
    pub fn job_status(&self, job_id: &str) -> Result<Option<JobStatusView>> {
        if let Some(job) = self.queue.snapshot(job_id) {
            return Ok(Some(JobStatusView::from(&job)));
        }
        Ok(self.store.get_job(job_id)?.as_ref().map(JobStatusView::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::staging::queue::tests::{fast_settings, MockGenerator};
    use crate::staging::AssetWriter;
    use crate::vibes::UnknownVibe;
    use tempfile::{tempdir, TempDir};

    fn service(generator: Arc<MockGenerator>) -> (TempDir, Arc<Database>, StagingService) {
        let dir = tempdir().unwrap();
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.initialize().unwrap();
        let queue = StagingQueue::start(
            fast_settings(1),
            db.clone(),
            generator,
            AssetWriter::new(dir.path().join("assets")),
        );
        let service = StagingService::new(db.clone(), Arc::new(queue));
        (dir, db, service)
    }

    fn request(vibes: &[&str]) -> BatchRequest {
        BatchRequest {
            input_image: "/uploads/empty-lounge.jpg".to_string(),
            room_type: "living room".to_string(),
            selected_vibes: vibes.iter().map(|v| v.to_string()).collect(),
            strictness: Strictness::Normal,
            room_notes: None,
        }
    }

    #[tokio::test]
    async fn test_two_vibes_end_to_end() {
        let generator = Arc::new(MockGenerator::default());
        let (_dir, _db, service) = service(generator.clone());

        let receipt = service.submit_batch(request(&["Coastal", "Minimalist"])).unwrap();
        assert_eq!(receipt.jobs.len(), 2);
        assert!(receipt.jobs.iter().all(|j| j.status == JobStatus::Queued));

        service.queue().wait_idle().await;

        let status = service.batch_status(&receipt.batch_id).unwrap().unwrap();
        assert_eq!(status.jobs.len(), 2);
        assert!(status.is_complete());
        assert_eq!(status.count(JobStatus::Done), 2);

        let json = serde_json::to_value(&status).unwrap();
        for job in json["jobs"].as_array().unwrap() {
            assert_eq!(job["status"], "done");
            assert!(job["outputImageUrl"].is_string());
        }
        assert_eq!(json["jobs"][0]["vibeId"], "Coastal");
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_submission_from_json() {
        let (_dir, _db, service) = service(Arc::new(MockGenerator::default()));
        let receipt = service
            .submit_json(
                r#"{"inputImage":"/uploads/a.jpg","roomType":"bedroom","selectedVibes":["naturalist"],"strictness":"strict"}"#,
            )
            .unwrap();
        service.queue().wait_idle().await;

        let job_id = &receipt.jobs[0].job_id;
        let view = service.job_status(job_id).unwrap().unwrap();
        assert_eq!(view.vibe_id, Vibe::Naturalist);
        assert_eq!(view.status, JobStatus::Done);
    }

    #[tokio::test]
    async fn test_invalid_submissions_create_no_jobs() {
        let generator = Arc::new(MockGenerator::default());
        let (_dir, db, service) = service(generator.clone());

        assert!(matches!(
            service.submit_json("{not json"),
            Err(SubmissionError::InvalidJson(_))
        ));

        let mut bad_room = request(&["Coastal"]);
        bad_room.room_type = "garage".to_string();
        assert!(matches!(
            service.submit_batch(bad_room),
            Err(SubmissionError::InvalidRoomType(_))
        ));

        match service.submit_batch(request(&["Coastal", "Brutalist"])) {
            Err(SubmissionError::UnknownVibe(UnknownVibe(name))) => assert_eq!(name, "Brutalist"),
            other => panic!("expected UnknownVibe, got {:?}", other),
        }

        assert!(matches!(
            service.submit_batch(request(&[])),
            Err(SubmissionError::NoVibesSelected)
        ));

        let mut no_image = request(&["Coastal"]);
        no_image.input_image = "  ".to_string();
        assert!(matches!(
            service.submit_batch(no_image),
            Err(SubmissionError::MissingInputImage)
        ));

        assert_eq!(service.queue().outstanding(), 0);
        assert_eq!(generator.call_count(), 0);
        assert!(db.jobs_for_batch("any").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_vibes_collapse() {
        let (_dir, _db, service) = service(Arc::new(MockGenerator::default()));
        let receipt = service
            .submit_batch(request(&["Coastal", "coastal", "Bohemian"]))
            .unwrap();
        let vibes: Vec<Vibe> = receipt.jobs.iter().map(|j| j.vibe_id).collect();
        assert_eq!(vibes, vec![Vibe::Coastal, Vibe::Bohemian]);
        service.queue().wait_idle().await;
    }

    #[tokio::test]
    async fn test_flagged_job_reports_flags_and_error() {
        let generator = Arc::new(MockGenerator::default());
        let (_dir, _db, service) = service(generator.clone());
        let mut req = request(&["Classicist"]);
        req.room_notes = Some("please remodel the fireplace".to_string());

        let receipt = service.submit_batch(req).unwrap();
        service.queue().wait_idle().await;

        let status = service.batch_status(&receipt.batch_id).unwrap().unwrap();
        let job = &status.jobs[0];
        assert_eq!(job.status, JobStatus::Flagged);
        assert_eq!(job.error.as_deref(), Some("Prompt failed staging quality gate"));
        assert_eq!(job.quality_flags, vec!["renovation_keyword_in_prompt:remodel"]);
        assert!(job.output_image_url.is_none());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let (_dir, _db, service) = service(Arc::new(MockGenerator::default()));
        assert!(service.batch_status("nope").unwrap().is_none());
        assert!(service.job_status("nope").unwrap().is_none());
    }
}

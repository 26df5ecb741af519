//! In-process staging scheduler.
//!
//! A fixed pool of workers pulls job ids from one FIFO channel. Every
//! provider call goes through a single [`ApiGateway`], so calls never
//! overlap and keep the configured gap regardless of the pool size.
//!
//! Job state is mirrored in memory for status polling; the [`JobStore`]
//! stays the source of truth after every update.

use anyhow::{anyhow, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinSet;

use super::assets::AssetWriter;
use super::prompt::escalate_negative_prompt;
use super::quality::{assess_output_metadata_if_available, assess_prompt_for_banned_terms};
use crate::config::Config;
use crate::db::{JobPatch, JobStatus, JobStore, StagingAsset, StagingJob};
use crate::gateway::{ApiGateway, ProviderError, RetryPolicy};
use crate::generation::{GenerationOutput, GenerationRequest, ImageGenerator};

pub const PROMPT_GATE_ERROR: &str = "Prompt failed staging quality gate";
pub const OUTPUT_GATE_ERROR: &str = "Output failed staging quality gate";
pub const NO_IMAGE_ERROR: &str = "Provider returned no image";

/// Provider attempts per job: the original call plus one escalated retry.
const MAX_JOB_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    pub concurrency: usize,
    /// Gap between provider calls, measured from the previous completion.
    pub min_interval: Duration,
    pub retry: RetryPolicy,
}

impl QueueSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            concurrency: config.queue.concurrency,
            min_interval: Duration::from_millis(config.queue.min_interval_ms),
            retry: RetryPolicy::from_config(&config.gateway),
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

struct Shared {
    store: Arc<dyn JobStore>,
    generator: Arc<dyn ImageGenerator>,
    gateway: ApiGateway,
    assets: AssetWriter,
    jobs: RwLock<HashMap<String, StagingJob>>,
    outstanding: AtomicUsize,
    idle: Notify,
}

pub struct StagingQueue {
    shared: Arc<Shared>,
    sender: Mutex<Option<mpsc::UnboundedSender<String>>>,
    workers: tokio::sync::Mutex<JoinSet<()>>,
}

impl StagingQueue {
    /// Spawn the worker pool. Must be called from inside a tokio runtime.
    pub fn start(
        settings: QueueSettings,
        store: Arc<dyn JobStore>,
        generator: Arc<dyn ImageGenerator>,
        assets: AssetWriter,
    ) -> Self {
        let shared = Arc::new(Shared {
            store,
            generator,
            gateway: ApiGateway::new("image-generation", settings.min_interval, settings.retry),
            assets,
            jobs: RwLock::new(HashMap::new()),
            outstanding: AtomicUsize::new(0),
            idle: Notify::new(),
        });

        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let concurrency = settings.concurrency.max(1);

        let mut workers = JoinSet::new();
        for worker in 0..concurrency {
            let shared = Arc::clone(&shared);
            let rx = Arc::clone(&rx);
            workers.spawn(async move {
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(job_id) = next else { break };
                    shared.process(&job_id).await;
                    if shared.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
                        shared.idle.notify_waiters();
                    }
                }
                tracing::debug!(worker, "Staging worker stopped");
            });
        }

        tracing::info!(
            concurrency,
            min_interval_ms = settings.min_interval.as_millis() as u64,
            "Staging queue started"
        );

        Self {
            shared,
            sender: Mutex::new(Some(tx)),
            workers: tokio::sync::Mutex::new(workers),
        }
    }

    /// Persist `job` as queued and schedule it. Fails if the store rejects
    /// the row or the queue has been shut down.
    pub fn enqueue(&self, mut job: StagingJob) -> Result<()> {
        let sender = self
            .sender
            .lock()
            .map_err(|_| anyhow!("staging queue lock poisoned"))?
            .clone()
            .ok_or_else(|| anyhow!("staging queue is shut down"))?;

        job.status = JobStatus::Queued;
        self.shared.store.create_job(&job)?;

        let job_id = job.id.clone();
        tracing::info!(job_id = %job_id, batch_id = %job.batch_id, vibe = %job.vibe, "Job queued");
        self.shared.mirror(job);
        self.shared.outstanding.fetch_add(1, Ordering::SeqCst);

        if sender.send(job_id.clone()).is_err() {
            self.shared.outstanding.fetch_sub(1, Ordering::SeqCst);
            return Err(anyhow!("staging queue is shut down; job {} not scheduled", job_id));
        }
        Ok(())
    }

    /// In-memory view of a job seen by this queue, if any.
    pub fn snapshot(&self, job_id: &str) -> Option<StagingJob> {
        self.shared.snapshot(job_id)
    }

    /// Jobs queued or in flight.
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::SeqCst)
    }

    /// Resolve once every enqueued job has reached a terminal state.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting jobs, let the workers drain the queue and join them.
    pub async fn shutdown(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        let mut workers = self.workers.lock().await;
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Staging worker panicked");
            }
        }
        tracing::info!("Staging queue shut down");
    }
}

impl Shared {
    fn snapshot(&self, job_id: &str) -> Option<StagingJob> {
        self.jobs.read().ok().and_then(|jobs| jobs.get(job_id).cloned())
    }

    fn mirror(&self, job: StagingJob) {
        if let Ok(mut jobs) = self.jobs.write() {
            jobs.insert(job.id.clone(), job);
        }
    }

    /// Write `patch` to the store and mirror the result. If the store
    /// fails the patch still lands in memory so pollers see progress.
    /// Returns `None` when the job is unknown or already terminal.
    fn update(&self, job_id: &str, patch: JobPatch) -> Option<StagingJob> {
        match self.store.update_job(job_id, &patch) {
            Ok(job) => {
                self.mirror(job.clone());
                Some(job)
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to persist job update");
                let mut job = self.snapshot(job_id)?;
                if let Err(e) = patch.apply_to(&mut job, Utc::now()) {
                    tracing::error!(job_id, error = %e, "Rejected job transition");
                    return None;
                }
                self.mirror(job.clone());
                Some(job)
            }
        }
    }

    fn finish(&self, job_id: &str, patch: JobPatch) {
        let status = patch.status;
        if let Some(job) = self.update(job_id, patch) {
            match status {
                Some(JobStatus::Done) => tracing::info!(job_id, "Job done"),
                Some(JobStatus::Flagged) => {
                    tracing::warn!(job_id, flags = ?job.quality_flags, "Job flagged")
                }
                _ => tracing::info!(job_id, error = ?job.error, "Job failed"),
            }
        }
    }

    async fn process(&self, job_id: &str) {
        let current = match self.snapshot(job_id) {
            Some(job) => Some(job),
            None => self.store.get_job(job_id).ok().flatten(),
        };
        let Some(current) = current else {
            tracing::error!(job_id, "Dequeued unknown job");
            return;
        };
        if current.status.is_terminal() {
            tracing::warn!(job_id, status = %current.status, "Skipping job already in a terminal state");
            return;
        }

        let Some(job) = self.update(job_id, JobPatch::status(JobStatus::Running)) else {
            return;
        };

        let flags = assess_prompt_for_banned_terms(&job.prompt, &job.negative_prompt);
        if !flags.is_empty() {
            self.finish(
                job_id,
                JobPatch {
                    status: Some(JobStatus::Flagged),
                    quality_flags: Some(flags),
                    error: Some(PROMPT_GATE_ERROR.to_string()),
                    ..Default::default()
                },
            );
            return;
        }

        let output = match self.generate_with_escalation(&job).await {
            Ok(output) => output,
            Err(e) => {
                self.finish(
                    job_id,
                    JobPatch {
                        status: Some(JobStatus::Failed),
                        error: Some(e.to_string()),
                        ..Default::default()
                    },
                );
                return;
            }
        };

        self.record_output(&job, output).await;
    }

    /// Call the provider; on failure retry once with an escalated negative
    /// prompt. Returns the last error when both attempts fail.
    async fn generate_with_escalation(&self, job: &StagingJob) -> Result<GenerationOutput, ProviderError> {
        let mut negative_prompt = job.negative_prompt.clone();
        let mut attempt = 1;

        loop {
            if attempt > 1 {
                negative_prompt = escalate_negative_prompt(&negative_prompt);
            }
            self.update(
                &job.id,
                JobPatch {
                    negative_prompt: (attempt > 1).then(|| negative_prompt.clone()),
                    attempts: Some(attempt),
                    ..Default::default()
                },
            );

            let request = GenerationRequest {
                prompt: job.prompt.clone(),
                negative_prompt: Some(negative_prompt.clone()),
                reference_image: Some(job.input_image.clone().into()),
            };

            let result = self
                .gateway
                .call("generate", || self.generator.generate(request.clone()))
                .await;

            match result {
                Ok(output) => return Ok(output),
                Err(e) if attempt < MAX_JOB_ATTEMPTS => {
                    tracing::warn!(
                        job_id = %job.id,
                        provider = self.generator.provider_name(),
                        error = %e,
                        "Generation failed, retrying with escalated negative prompt"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn record_output(&self, job: &StagingJob, output: GenerationOutput) {
        let flags = assess_output_metadata_if_available(output.metadata.as_ref());

        let output_url = match output.image.as_deref() {
            Some(bytes) => match self.assets.save(&job.batch_id, &job.id, bytes).await {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::error!(job_id = %job.id, error = %e, "Failed to store staging output");
                    if flags.is_empty() {
                        self.finish(
                            &job.id,
                            JobPatch {
                                status: Some(JobStatus::Failed),
                                error: Some(format!("Failed to store output: {}", e)),
                                ..Default::default()
                            },
                        );
                        return;
                    }
                    None
                }
            },
            None => None,
        };

        if !flags.is_empty() {
            self.finish(
                &job.id,
                JobPatch {
                    status: Some(JobStatus::Flagged),
                    output_image_url: output_url,
                    quality_flags: Some(flags),
                    error: Some(OUTPUT_GATE_ERROR.to_string()),
                    ..Default::default()
                },
            );
            return;
        }

        let Some(image_url) = output_url else {
            self.finish(
                &job.id,
                JobPatch {
                    status: Some(JobStatus::Failed),
                    error: Some(NO_IMAGE_ERROR.to_string()),
                    ..Default::default()
                },
            );
            return;
        };

        let asset = StagingAsset {
            id: uuid::Uuid::new_v4().to_string(),
            job_id: job.id.clone(),
            batch_id: job.batch_id.clone(),
            vibe: job.vibe,
            image_url: image_url.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.create_asset(&asset) {
            tracing::error!(job_id = %job.id, error = %e, "Failed to record staging asset");
            self.finish(
                &job.id,
                JobPatch {
                    status: Some(JobStatus::Failed),
                    output_image_url: Some(image_url),
                    error: Some(format!("Failed to record asset: {}", e)),
                    ..Default::default()
                },
            );
            return;
        }

        self.finish(
            &job.id,
            JobPatch {
                status: Some(JobStatus::Done),
                output_image_url: Some(image_url),
                ..Default::default()
            },
        );
    }
}

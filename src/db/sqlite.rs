//! SQLite job store.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::jobs::{JobPatch, JobStatus, StagingAsset, StagingJob};
use super::schema::SCHEMA;
use super::JobStore;
use crate::staging::{RoomType, Strictness};
use crate::vibes::{Vibe, DEFAULT_VIBE};

const JOB_COLUMNS: &str = "id, batch_id, vibe, room_type, room_notes, input_image, prompt, \
     negative_prompt, strictness, status, output_image_url, quality_flags, error, attempts, \
     created_at, updated_at, started_at, completed_at";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("database connection lock poisoned"))
    }

    fn load_job(conn: &Connection, id: &str) -> Result<Option<StagingJob>> {
        let sql = format!("SELECT {} FROM staging_jobs WHERE id = ?", JOB_COLUMNS);
        let job = conn.query_row(&sql, [id], row_to_job).optional()?;
        Ok(job)
    }
}

impl JobStore for Database {
    fn create_job(&self, job: &StagingJob) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO staging_jobs ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                JOB_COLUMNS
            ),
            params![
                job.id,
                job.batch_id,
                job.vibe.as_str(),
                job.room_type.as_str(),
                job.room_notes,
                job.input_image,
                job.prompt,
                job.negative_prompt,
                job.strictness.as_str(),
                job.status.as_str(),
                job.output_image_url,
                serde_json::to_string(&job.quality_flags)?,
                job.error,
                job.attempts,
                job.created_at.to_rfc3339(),
                job.updated_at.to_rfc3339(),
                job.started_at.map(|t| t.to_rfc3339()),
                job.completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn get_job(&self, id: &str) -> Result<Option<StagingJob>> {
        let conn = self.conn()?;
        Self::load_job(&conn, id)
    }

    fn jobs_for_batch(&self, batch_id: &str) -> Result<Vec<StagingJob>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM staging_jobs WHERE batch_id = ? ORDER BY rowid",
            JOB_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let jobs = stmt
            .query_map([batch_id], row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    fn update_job(&self, id: &str, patch: &JobPatch) -> Result<StagingJob> {
        let conn = self.conn()?;
        let mut job = Self::load_job(&conn, id)?.ok_or_else(|| anyhow!("staging job {} not found", id))?;
        patch.apply_to(&mut job, Utc::now())?;

        conn.execute(
            r#"
            UPDATE staging_jobs
            SET status = ?1, negative_prompt = ?2, output_image_url = ?3, quality_flags = ?4,
                error = ?5, attempts = ?6, updated_at = ?7, started_at = ?8, completed_at = ?9
            WHERE id = ?10
            "#,
            params![
                job.status.as_str(),
                job.negative_prompt,
                job.output_image_url,
                serde_json::to_string(&job.quality_flags)?,
                job.error,
                job.attempts,
                job.updated_at.to_rfc3339(),
                job.started_at.map(|t| t.to_rfc3339()),
                job.completed_at.map(|t| t.to_rfc3339()),
                job.id,
            ],
        )?;
        Ok(job)
    }

    fn create_asset(&self, asset: &StagingAsset) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO staging_assets (id, job_id, batch_id, vibe, image_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                asset.id,
                asset.job_id,
                asset.batch_id,
                asset.vibe.as_str(),
                asset.image_url,
                asset.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn asset_for_job(&self, job_id: &str) -> Result<Option<StagingAsset>> {
        let conn = self.conn()?;
        let asset = conn
            .query_row(
                "SELECT id, job_id, batch_id, vibe, image_url, created_at FROM staging_assets WHERE job_id = ?",
                [job_id],
                |row| {
                    Ok(StagingAsset {
                        id: row.get(0)?,
                        job_id: row.get(1)?,
                        batch_id: row.get(2)?,
                        vibe: parse_vibe(&row.get::<_, String>(3)?),
                        image_url: row.get(4)?,
                        created_at: parse_time(&row.get::<_, String>(5)?),
                    })
                },
            )
            .optional()?;
        Ok(asset)
    }
}

fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

fn parse_vibe(s: &str) -> Vibe {
    Vibe::from_name(s).unwrap_or(DEFAULT_VIBE)
}

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<StagingJob> {
    let vibe: String = row.get(2)?;
    let room_type: String = row.get(3)?;
    let strictness: String = row.get(8)?;
    let status: String = row.get(9)?;
    let flags: String = row.get(11)?;
    let created_at: String = row.get(14)?;
    let updated_at: String = row.get(15)?;
    let started_at: Option<String> = row.get(16)?;
    let completed_at: Option<String> = row.get(17)?;

    Ok(StagingJob {
        id: row.get(0)?,
        batch_id: row.get(1)?,
        vibe: parse_vibe(&vibe),
        room_type: RoomType::parse(&room_type).unwrap_or_default(),
        room_notes: row.get(4)?,
        input_image: row.get(5)?,
        prompt: row.get(6)?,
        negative_prompt: row.get(7)?,
        strictness: Strictness::from_str(&strictness).unwrap_or_default(),
        status: JobStatus::from_str(&status).unwrap_or(JobStatus::Failed),
        output_image_url: row.get(10)?,
        quality_flags: serde_json::from_str(&flags).unwrap_or_default(),
        error: row.get(12)?,
        attempts: row.get(13)?,
        created_at: parse_time(&created_at),
        updated_at: parse_time(&updated_at),
        started_at: started_at.as_deref().map(parse_time),
        completed_at: completed_at.as_deref().map(parse_time),
    })
}

pub const SCHEMA: &str = r#"
-- One row per (batch, vibe) generation attempt; rows are never deleted
CREATE TABLE IF NOT EXISTS staging_jobs (
    id TEXT PRIMARY KEY,
    batch_id TEXT NOT NULL,
    vibe TEXT NOT NULL,
    room_type TEXT NOT NULL,
    room_notes TEXT,
    input_image TEXT NOT NULL,
    prompt TEXT NOT NULL,
    negative_prompt TEXT NOT NULL,
    strictness TEXT NOT NULL DEFAULT 'normal',
    status TEXT NOT NULL DEFAULT 'queued',
    output_image_url TEXT,
    quality_flags TEXT NOT NULL DEFAULT '[]',  -- JSON array
    error TEXT,
    attempts INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    started_at TEXT,
    completed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_staging_jobs_batch ON staging_jobs(batch_id);
CREATE INDEX IF NOT EXISTS idx_staging_jobs_status ON staging_jobs(status);

-- Accepted outputs, 1:1 with done jobs
CREATE TABLE IF NOT EXISTS staging_assets (
    id TEXT PRIMARY KEY,
    job_id TEXT NOT NULL UNIQUE REFERENCES staging_jobs(id),
    batch_id TEXT NOT NULL,
    vibe TEXT NOT NULL,
    image_url TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_staging_assets_batch ON staging_assets(batch_id);
"#;

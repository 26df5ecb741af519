//! Logging setup with journald support on Linux.
//!
//! Falls back to a daily rolling log file when journald is unavailable or
//! on other platforms.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `VIBESTAGE_LOG=debug`
/// or `VIBESTAGE_LOG=vibestage::gateway=trace`.
pub const LOG_ENV: &str = "VIBESTAGE_LOG";

/// Initialize the logging system. Call once at startup.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journald_layer.with_syslog_identifier("vibestage".to_string()))
                .init();

            tracing::info!("Logging initialized with journald backend");
            return Ok(());
        }
    }

    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "vibestage.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The worker flushes on drop, so it has to outlive every log call.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!(log_dir = %log_dir.display(), "Logging initialized with file backend");
    Ok(())
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vibestage")
        .join("logs")
}

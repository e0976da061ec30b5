//! File logging for a play session.
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE: &str = "client.log";

/// Installs the global subscriber.
///
/// Logs always go to `<cache>/logs/<session>/client.log` so they never
/// interleave with the game text on stdout. Setting `JRPG_LOG_STDERR` adds a
/// stderr layer. Keep the returned guard alive for the whole session or
/// buffered lines are lost.
pub fn setup_logging(session_id: Option<&str>) -> Result<WorkerGuard> {
    let session_id = session_id.map(str::to_string).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        format!("session_{secs}")
    });

    let session_dir = log_directory().join(&session_id);
    std::fs::create_dir_all(&session_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
    let stderr_layer = std::env::var_os("JRPG_LOG_STDERR")
        .map(|_| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(session = %session_id, "logging initialized");
    tracing::info!("log file: {}", session_dir.join(LOG_FILE).display());

    Ok(guard)
}

fn log_directory() -> PathBuf {
    ProjectDirs::from("", "", "jrpg")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("jrpg").join("logs"))
}

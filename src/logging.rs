//! File logging for voxmemo.
//!
//! Logs go to a daily-rotated file under the XDG state directory and never to
//! the terminal, which the recorder page redraws constantly. Only the most
//! recent log files are kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

pub const LOG_FILE_PREFIX: &str = "voxmemo.log";
const MAX_LOG_FILES: usize = 7;

/// Keeps the non-blocking writer flushing for the lifetime of the process.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Installs the global subscriber writing to the rolling log file.
///
/// The level comes from `RUST_LOG` and defaults to `info`.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    if let Err(e) = prune_logs(&log_dir, MAX_LOG_FILES) {
        eprintln!("Warning: Failed to clean up old logs: {e}");
    }

    let file_appender = rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging to {}", log_dir.display());
    Ok(())
}

/// `$XDG_STATE_HOME/voxmemo`, or `~/.local/state/voxmemo`.
pub fn log_dir() -> anyhow::Result<PathBuf> {
    if let Ok(state) = std::env::var("XDG_STATE_HOME") {
        if !state.is_empty() {
            return Ok(PathBuf::from(state).join("voxmemo"));
        }
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local/state/voxmemo"))
}

/// Removes dated log files (`voxmemo.log.YYYY-MM-DD`) beyond the `keep` newest.
///
/// Returns how many files were removed.
fn prune_logs(log_dir: &Path, keep: usize) -> anyhow::Result<usize> {
    let dated_prefix = format!("{LOG_FILE_PREFIX}.");
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_string_lossy().to_string();
            let date = name.strip_prefix(&dated_prefix)?;
            if date.matches('-').count() != 2 {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(keep) {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to delete old log file {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_prune_keeps_newest_dated_files() {
        let dir = std::env::temp_dir().join(format!("voxmemo_logs_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let base = SystemTime::now() - Duration::from_secs(3600);
        for day in 1..=4 {
            let path = dir.join(format!("{LOG_FILE_PREFIX}.2026-01-0{day}"));
            let file = fs::File::create(&path).unwrap();
            file.set_modified(base + Duration::from_secs(day * 60)).unwrap();
        }
        fs::write(dir.join("notes.txt"), "keep me").unwrap();

        assert_eq!(prune_logs(&dir, 2).unwrap(), 2);
        assert!(dir.join(format!("{LOG_FILE_PREFIX}.2026-01-04")).exists());
        assert!(dir.join(format!("{LOG_FILE_PREFIX}.2026-01-03")).exists());
        assert!(!dir.join(format!("{LOG_FILE_PREFIX}.2026-01-01")).exists());
        assert!(dir.join("notes.txt").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}

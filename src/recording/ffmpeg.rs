//! Locating the ffmpeg binary used for non-WAV output formats.

use std::path::{Path, PathBuf};

const WELL_KNOWN: &[&str] = &[
    "/opt/homebrew/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/usr/bin/ffmpeg",
    "/snap/bin/ffmpeg",
];

/// Finds ffmpeg in the usual install locations, then on `PATH`.
///
/// Terminal launchers often run with a trimmed `PATH`, so the fixed locations
/// are checked first.
pub fn find_ffmpeg() -> Option<PathBuf> {
    let binary = if cfg!(target_os = "windows") {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    };

    let found = WELL_KNOWN
        .iter()
        .map(PathBuf::from)
        .find(|candidate| is_file(candidate))
        .or_else(|| find_on_path(binary));
    match &found {
        Some(path) => tracing::debug!("Found ffmpeg at: {}", path.display()),
        None => tracing::debug!("ffmpeg not found"),
    }
    found
}

/// Searches the directories in `PATH` for an executable named `binary`.
pub fn find_on_path(binary: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_file(candidate))
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ffmpeg_returns_existing_file() {
        // Passes with or without ffmpeg installed
        if let Some(path) = find_ffmpeg() {
            assert!(path.is_file());
        }
    }

    #[test]
    fn test_find_on_path_misses_unknown_binary() {
        assert!(find_on_path("voxmemo-definitely-not-installed").is_none());
    }
}

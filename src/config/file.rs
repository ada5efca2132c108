//! Configuration file management for voxmemo.
//!
//! Configuration lives in `~/.config/voxmemo/voxmemo.toml`. A file with the
//! default values is written the first time the recorder runs. Every field has
//! a default, so partial files are fine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::filename::{is_valid_date_format, DEFAULT_DATE_FORMAT};

/// Where recordings are saved and listed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the memo server; stored files are also served from here
    pub base_url: String,
    /// Endpoint receiving multipart uploads
    pub save_path: String,
    /// Endpoint returning the JSON array of stored filenames
    pub records_path: String,
    /// Multipart field carrying the recording
    pub field_name: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            save_path: "/save".to_string(),
            records_path: "/records".to_string(),
            field_name: "audio".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Audio capture and encoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `voxmemo list-devices`
    /// - device name from `voxmemo list-devices`
    pub device: String,
    /// Preferred sample rate in Hz. The device's native rate wins if they differ.
    pub sample_rate: u32,
    /// "wav", or an ffmpeg format string "codec [options]" (e.g. "mp3 -ab 32k")
    pub output_format: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            sample_rate: 16000,
            output_format: "wav".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// "auto" picks the first of ffplay, mpv, cvlc, afplay found on PATH
    pub player: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            player: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// strftime-style format for record dates
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VoxConfig {
    pub server: ServerConfig,
    pub audio: AudioConfig,
    pub playback: PlaybackConfig,
    pub display: DisplayConfig,
}

impl VoxConfig {
    /// Loads the configuration, creating the file with defaults if it is missing.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be read or written
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
            tracing::info!("Default configuration written to {}", path.display());
            return Ok(config);
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid configuration in {}: {e}", path.display()))?;
        if !is_valid_date_format(&config.display.date_format) {
            return Err(anyhow::anyhow!(
                "Invalid configuration in {}: display.date_format '{}' is not a valid strftime format",
                path.display(),
                config.display.date_format
            ));
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Path of the config file: `~/.config/voxmemo/voxmemo.toml`.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".config").join("voxmemo").join("voxmemo.toml"))
}

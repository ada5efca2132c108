//! Configuration management for voxmemo.
//!
//! Loads the TOML configuration describing the memo server, the audio input,
//! the playback program and how dates are displayed.

pub mod file;

pub use file::{config_path, AudioConfig, DisplayConfig, PlaybackConfig, ServerConfig, VoxConfig};

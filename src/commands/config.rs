//! Open the configuration file in the user's editor.

use std::process::Command;

use crate::config::{config_path, VoxConfig};
use crate::recording::ffmpeg::find_on_path;

/// Opens `~/.config/voxmemo/voxmemo.toml`, writing the defaults first if it is missing.
///
/// Uses `$EDITOR`, then nano, then vi. The file is validated after the editor exits.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor can be found or it exits with an error
pub fn handle_config() -> anyhow::Result<()> {
    let path = config_path()?;
    if !path.exists() {
        VoxConfig::default().save_to(&path)?;
    }
    tracing::info!("Opening config file: {}", path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor).arg(&path).status().map_err(|e| {
        anyhow::anyhow!(
            "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
        )
    })?;
    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    match VoxConfig::load_from(&path) {
        Ok(_) => tracing::info!("Config file edited successfully"),
        Err(e) => {
            tracing::warn!("Edited config is invalid: {e}");
            eprintln!("Warning: {e}");
        }
    }
    Ok(())
}

fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }
    ["nano", "vi"]
        .into_iter()
        .find(|editor| find_on_path(editor).is_some())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}

//! List available audio input devices.

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::recording::device::suppress_alsa_warnings;

/// Lists the input devices `audio.device` can name, by index or by name.
///
/// # Errors
/// - If the audio host cannot enumerate its devices
pub fn handle_list_devices() -> anyhow::Result<()> {
    let (default_name, devices) = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let devices: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?
            // Skip devices that cannot even report a name
            .filter(|d| d.name().is_ok())
            .collect();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());
        anyhow::Ok((default_name, devices))
    })?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    println!();
    println!("Available audio input devices:");
    println!();

    for (index, device) in devices.iter().enumerate() {
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let marker = if default_name.as_ref() == Some(&name) {
            " [DEFAULT]"
        } else {
            ""
        };
        let config_info = suppress_alsa_warnings(|| match device.default_input_config() {
            Ok(config) => format!("{}Hz, {} channels", config.sample_rate().0, config.channels()),
            Err(_) => "configuration unavailable".to_string(),
        });

        println!("  ID: {index}");
        println!("    Name: {name}{marker}");
        println!("    Config: {config_info}");
        println!();
    }

    println!("Set audio.device in ~/.config/voxmemo/voxmemo.toml to an ID or name.");
    Ok(())
}

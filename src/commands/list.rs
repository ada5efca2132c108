//! Print the recordings stored on the memo server.

use cliclack::{intro, note, outro};
use console::style;

use crate::config::VoxConfig;
use crate::records::EMPTY_PLACEHOLDER;
use crate::store::{display_label, HttpRecordsClient, RecordsApi};

/// Fetches the listing once and prints it.
///
/// With `json` the raw filenames are written to stdout as a JSON array, for
/// piping into other tools.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the memo server cannot be reached or answers with an error
pub async fn handle_list(json: bool) -> anyhow::Result<()> {
    let config = VoxConfig::load()?;
    let client = HttpRecordsClient::new(&config.server)?;
    let files = client.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    intro(style(" records ").on_white().black())?;
    note(&config.server.base_url, format_listing(&files, &client, &config.display.date_format))?;
    outro(format!("{} record(s)", files.len()))?;
    Ok(())
}

fn format_listing<S: RecordsApi>(files: &[String], store: &S, date_format: &str) -> String {
    if files.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            format!(
                "{:>3}. {}\n     {}",
                index + 1,
                display_label(file, date_format),
                style(store.media_url(file)).dim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! The interactive recorder.
//!
//! Redraws the page after every action and offers the controls that apply to
//! the current state: record/stop, save and remove while a recording is
//! pending, and play/pause for each saved record.

use cliclack::{intro, outro, select};
use console::{style, Term};

use crate::config::VoxConfig;
use crate::playback::{ExternalPlayer, MediaPlayer};
use crate::recording::{AudioInput, CpalInput, Encoder, OutputFormat};
use crate::store::{display_label, HttpRecordsClient, RecordsApi};
use crate::ui::{Dialogs, Page, TerminalDialogs};
use crate::wiring::{MemoApp, SaveOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Record,
    Save,
    Remove,
    Preview,
    Playback(usize),
    Refresh,
    Quit,
}

/// Opens the recorder page and runs it until the user quits.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the configured output format is invalid
/// - If the terminal cannot be drawn to
pub async fn handle_run() -> anyhow::Result<()> {
    tracing::info!("=== voxmemo recorder started ===");

    // Ctrl-C cancels the current prompt instead of killing the process mid-capture
    if let Err(e) = ctrlc::set_handler(|| {}) {
        tracing::warn!("Failed to install Ctrl-C handler: {e}");
    }

    let config = VoxConfig::load()?;
    tracing::info!(
        "Configuration loaded: server={}, device={}, format={}",
        config.server.base_url,
        config.audio.device,
        config.audio.output_format
    );

    let format = OutputFormat::parse(&config.audio.output_format)
        .map_err(|e| anyhow::anyhow!("Invalid audio.output_format: {e}"))?;
    let store = HttpRecordsClient::new(&config.server)?;

    let mut app = MemoApp::new(
        Page::new(),
        CpalInput::new(config.audio.device.clone(), config.audio.sample_rate),
        Encoder::new(format),
        store,
        ExternalPlayer::new(&config.playback.player),
        TerminalDialogs,
        &config.display.date_format,
    );
    app.start().await;

    let term = Term::stdout();
    loop {
        app.tick();
        draw(&term, &app)?;

        let action = match choose(&app, &config.display.date_format) {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!("Action menu dismissed: {e}");
                Action::Quit
            }
        };
        tracing::debug!("Action: {:?}", action);

        match action {
            Action::Record => app.on_record().await,
            Action::Save => {
                if let SaveOutcome::Saved(filename) = app.on_save().await {
                    tracing::info!("Saved {}", filename);
                }
            }
            Action::Remove => {
                app.on_remove();
            }
            Action::Preview => {
                if let Err(e) = app.toggle_preview_playback() {
                    tracing::warn!("Preview playback failed: {e}");
                }
            }
            Action::Playback(index) => {
                app.toggle_playback(index);
            }
            Action::Refresh => {
                app.refresh().await;
            }
            Action::Quit => break,
        }
    }

    outro("Bye")?;
    tracing::info!("=== voxmemo recorder exited ===");
    Ok(())
}

fn draw<A, S, P, D>(term: &Term, app: &MemoApp<A, S, P, D>) -> anyhow::Result<()>
where
    A: AudioInput,
    S: RecordsApi,
    P: MediaPlayer + Clone,
    D: Dialogs,
{
    term.clear_screen()?;
    intro(style(" voxmemo ").on_white().black())?;
    term.write_line(&app.page().render())?;

    if let Some(elapsed) = app.recording_elapsed() {
        term.write_line(&format!(
            "  {}",
            style(format!("recording for {}s", elapsed.as_secs())).red()
        ))?;
    }
    if let Some(status) = app.status() {
        term.write_line(&format!("  {}", style(status).yellow()))?;
    }
    Ok(())
}

fn choose<A, S, P, D>(app: &MemoApp<A, S, P, D>, date_format: &str) -> std::io::Result<Action>
where
    A: AudioInput,
    S: RecordsApi,
    P: MediaPlayer + Clone,
    D: Dialogs,
{
    let mut menu = select("What next?");
    menu = if app.is_recording() {
        menu.item(Action::Record, "Stop recording", "")
    } else {
        menu.item(Action::Record, "Record", "")
    };

    if app.page().action_bar_visible() {
        menu = menu
            .item(Action::Save, "Save recording", "")
            .item(Action::Preview, "Play/pause preview", "")
            .item(Action::Remove, "Remove recording", "");
    }

    for (index, item) in app.records().items().iter().enumerate() {
        let verb = if item.is_playing() { "Pause" } else { "Play" };
        let label = display_label(item.filename(), date_format);
        menu = menu.item(Action::Playback(index), format!("{verb} {label}"), "");
    }

    menu.item(Action::Refresh, "Refresh records", "")
        .item(Action::Quit, "Quit", "")
        .interact()
}

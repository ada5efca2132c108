//! Binds the page controls to the controllers.
//!
//! - record: toggles the capture session; a finished recording goes to the preview
//! - save: asks for a name, uploads the pending recording, then refreshes the list
//! - remove: asks for confirmation, then discards the pending recording
//!
//! Upload always completes before the refresh starts, so a just-saved
//! recording is part of the listing that follows it.

use crate::playback::{MediaElement, MediaPlayer, PlaybackError};
use crate::preview::PreviewController;
use crate::recording::{AudioInput, CaptureSession, Encoder, ToggleOutcome};
use crate::records::RecordsList;
use crate::store::{RecordFilename, RecordsApi, StoreError};
use crate::ui::dialogs::Dialogs;
use crate::ui::page::Page;

pub const SAVE_PROMPT: &str = "Enter a name for the recording:";
pub const REMOVE_CONFIRM: &str = "Are you sure?";

/// Result of the save control.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(RecordFilename),
    /// There was no recording waiting to be saved.
    NothingPending,
    /// Upload failed; the preview is kept so the user can retry.
    Failed(StoreError),
}

/// Milliseconds since the Unix epoch.
pub type Clock = Box<dyn Fn() -> i64>;

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The recorder page with all its controllers.
pub struct MemoApp<A: AudioInput, S: RecordsApi, P: MediaPlayer, D: Dialogs> {
    page: Page,
    session: CaptureSession<A>,
    preview: PreviewController,
    records: RecordsList<P>,
    preview_player: P,
    preview_media: Option<P::Media>,
    store: S,
    dialogs: D,
    clock: Clock,
    status: Option<String>,
}

impl<A, S, P, D> MemoApp<A, S, P, D>
where
    A: AudioInput,
    S: RecordsApi,
    P: MediaPlayer + Clone,
    D: Dialogs,
{
    pub fn new(
        page: Page,
        input: A,
        encoder: Encoder,
        store: S,
        player: P,
        dialogs: D,
        date_format: &str,
    ) -> Self {
        let session = CaptureSession::new(input, encoder, page.record_img.clone());
        let preview = PreviewController::new(page.audio_box.clone(), page.record_box.clone());
        let records = RecordsList::new(page.records_box.clone(), player.clone(), date_format);
        Self {
            page,
            session,
            preview,
            records,
            preview_player: player,
            preview_media: None,
            store,
            dialogs,
            clock: Box::new(system_clock),
            status: None,
        }
    }

    /// Replaces the wall clock used for filenames.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn records(&self) -> &RecordsList<P> {
        &self.records
    }

    pub fn preview(&self) -> &PreviewController {
        &self.preview
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    pub fn recording_elapsed(&self) -> Option<std::time::Duration> {
        self.session.elapsed()
    }

    /// Last reported problem, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Initial load of the records list.
    pub async fn start(&mut self) {
        self.refresh().await;
    }

    /// Record control.
    pub async fn on_record(&mut self) {
        let outcome = self.session.toggle_recording().await;
        self.apply(outcome);
    }

    /// Save control.
    pub async fn on_save(&mut self) -> SaveOutcome {
        if self.preview.pending().is_none() {
            tracing::warn!("Save requested with no pending recording");
            return SaveOutcome::NothingPending;
        }

        let name = self.dialogs.prompt(SAVE_PROMPT);
        let filename = RecordFilename::new((self.clock)(), name.as_deref());

        let result = match self.preview.pending() {
            Some(blob) => self.store.upload(blob, &filename).await,
            None => return SaveOutcome::NothingPending,
        };

        match result {
            Ok(()) => {
                self.stop_preview_playback();
                self.preview.discard();
                self.status = None;
                self.refresh().await;
                SaveOutcome::Saved(filename)
            }
            Err(e) => {
                tracing::error!("Failed to save recording {}: {}", filename, e);
                self.status = Some(format!("Save failed: {e}"));
                SaveOutcome::Failed(e)
            }
        }
    }

    /// Remove control. Returns whether the pending recording was discarded.
    pub fn on_remove(&mut self) -> bool {
        if !self.dialogs.confirm(REMOVE_CONFIRM) {
            return false;
        }
        self.stop_preview_playback();
        self.preview.discard();
        tracing::info!("Pending recording discarded");
        true
    }

    /// Re-fetches and re-renders the records list. Returns whether it succeeded.
    pub async fn refresh(&mut self) -> bool {
        match self.records.refresh(&self.store).await {
            Ok(_) => true,
            Err(e) => {
                self.status = Some(format!("Could not load records: {e}"));
                false
            }
        }
    }

    /// Play/pause button of the record at `index`.
    pub fn toggle_playback(&mut self, index: usize) -> Option<bool> {
        self.records.toggle(index)
    }

    /// Plays or pauses the pending recording's preview.
    pub fn toggle_preview_playback(&mut self) -> Result<bool, PlaybackError> {
        let Some(src) = self.preview.source() else {
            return Ok(false);
        };

        let stale = self
            .preview_media
            .as_ref()
            .is_some_and(|media| media.src() != src);
        if stale {
            self.preview_media = None;
        }

        let player = &self.preview_player;
        let media = self.preview_media.get_or_insert_with(|| player.open(&src));
        media.take_ended();
        if media.paused() {
            media.play()?;
        } else {
            media.pause();
        }
        Ok(!media.paused())
    }

    /// Processes device events and finished playbacks that arrived since the last call.
    pub fn tick(&mut self) {
        if let Some(outcome) = self.session.poll_events() {
            self.apply(outcome);
        }
        self.records.poll_ended();
        if let Some(media) = &mut self.preview_media {
            media.take_ended();
        }
    }

    fn apply(&mut self, outcome: ToggleOutcome) {
        match outcome {
            ToggleOutcome::Started => self.status = None,
            ToggleOutcome::Finished(blob) => {
                self.stop_preview_playback();
                self.preview.show(blob);
            }
            ToggleOutcome::Rejected(e) => {
                tracing::warn!("Record request rejected: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn stop_preview_playback(&mut self) {
        self.preview_media = None;
    }
}

//! The list of saved recordings.
//!
//! Every refresh throws the rendered list away and rebuilds it from the
//! server's listing. Each entry owns one media element; its play/pause icon
//! always follows that element's paused state.

use crate::playback::{MediaElement, MediaPlayer};
use crate::store::{display_label, RecordsApi, StoreError};
use crate::ui::element::{el, ElementRef};
use crate::ui::page::icons;

pub const EMPTY_PLACEHOLDER: &str = "No records. Create one";

/// One rendered recording with its own playback state.
pub struct PlaybackItem<M> {
    filename: String,
    element: ElementRef,
    icon: ElementRef,
    media: M,
}

impl<M: MediaElement> PlaybackItem<M> {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn is_playing(&self) -> bool {
        !self.media.paused()
    }

    pub fn icon(&self) -> String {
        self.icon
            .borrow()
            .text_attr("src")
            .unwrap_or_default()
            .to_string()
    }

    fn set_icon(&self, src: &str) {
        self.icon.borrow_mut().set_attr("src", src);
    }

    /// Plays when paused, pauses when playing, and updates the icon to match.
    fn toggle(&mut self) {
        if self.media.take_ended() {
            self.set_icon(icons::PLAY);
        }
        if self.media.paused() {
            match self.media.play() {
                Ok(()) => self.set_icon(icons::PAUSE),
                Err(e) => tracing::warn!("Failed to play {}: {}", self.filename, e),
            }
        } else {
            self.media.pause();
            self.set_icon(icons::PLAY);
        }
    }
}

pub struct RecordsList<P: MediaPlayer> {
    container: ElementRef,
    player: P,
    date_format: String,
    items: Vec<PlaybackItem<P::Media>>,
}

impl<P: MediaPlayer> RecordsList<P> {
    pub fn new(container: ElementRef, player: P, date_format: impl Into<String>) -> Self {
        Self {
            container,
            player,
            date_format: date_format.into(),
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[PlaybackItem<P::Media>] {
        &self.items
    }

    #[cfg(test)]
    pub(crate) fn media_mut(&mut self, index: usize) -> Option<&mut P::Media> {
        self.items.get_mut(index).map(|item| &mut item.media)
    }

    /// Fetches the listing and rebuilds the list from it.
    ///
    /// When the fetch fails the current list is left as it is.
    pub async fn refresh<S: RecordsApi>(&mut self, store: &S) -> Result<usize, StoreError> {
        let files = store.list().await.map_err(|e| {
            tracing::error!("Failed to fetch records: {}", e);
            e
        })?;
        self.render(&files, store);
        Ok(files.len())
    }

    fn render<S: RecordsApi>(&mut self, files: &[String], store: &S) {
        // Dropping the items stops anything still playing
        self.items.clear();
        self.container.borrow_mut().clear_children();

        if files.is_empty() {
            let placeholder = el("p").text(EMPTY_PLACEHOLDER).build();
            self.container.borrow_mut().append(placeholder);
            return;
        }

        for file in files {
            let item = self.build_item(file, &store.media_url(file));
            self.container.borrow_mut().append(item.element.clone());
            self.items.push(item);
        }
        tracing::debug!("Rendered {} records", self.items.len());
    }

    fn build_item(&self, filename: &str, src: &str) -> PlaybackItem<P::Media> {
        let element = el("div")
            .class("audio_item")
            .child(el("audio").attr("src", src))
            .build();
        let icon = el("img").attr("src", icons::PLAY).build();
        let button = el("button").class("btn").build();
        button.borrow_mut().append(icon.clone());
        let label = el("p")
            .text(display_label(filename, &self.date_format))
            .build();
        {
            let mut element = element.borrow_mut();
            element.append(button);
            element.append(label);
        }

        PlaybackItem {
            filename: filename.to_string(),
            element,
            icon,
            media: self.player.open(src),
        }
    }

    /// Toggles playback of the item at `index`; returns whether it is now playing.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let item = self.items.get_mut(index)?;
        item.toggle();
        Some(item.is_playing())
    }

    /// Resets the icon of every item whose playback reached its end.
    pub fn poll_ended(&mut self) -> usize {
        let mut ended = 0;
        for item in &mut self.items {
            if item.media.take_ended() {
                item.set_icon(icons::PLAY);
                ended += 1;
            }
        }
        ended
    }
}

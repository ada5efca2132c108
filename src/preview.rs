//! Inline preview of the most recent unsaved recording.
//!
//! At most one preview exists. Showing a new one first removes the previous
//! audio element and revokes its temporary object URL.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::recording::RecordingBlob;
use crate::ui::element::{el, ElementRef};
use crate::ui::page::{HIDE, SHOW};

static NEXT_URL_ID: AtomicUsize = AtomicUsize::new(0);

/// Temporary, file-backed reference to a blob that media players can open.
///
/// The backing file is removed when the URL is dropped.
#[derive(Debug)]
pub struct ObjectUrl {
    path: PathBuf,
}

impl ObjectUrl {
    pub fn create(blob: &RecordingBlob) -> std::io::Result<Self> {
        let id = NEXT_URL_ID.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "voxmemo_preview_{}_{}.{}",
            std::process::id(),
            id,
            blob.extension()
        ));
        std::fs::write(&path, blob.bytes())?;
        Ok(Self { path })
    }

    pub fn as_str(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!("Failed to revoke preview {}: {}", self.path.display(), e);
        }
    }
}

/// Holds the pending blob and draws its preview into the action bar.
pub struct PreviewController {
    audio_box: ElementRef,
    action_bar: ElementRef,
    pending: Option<RecordingBlob>,
    current: Option<(ElementRef, Option<ObjectUrl>)>,
}

impl PreviewController {
    pub fn new(audio_box: ElementRef, action_bar: ElementRef) -> Self {
        Self {
            audio_box,
            action_bar,
            pending: None,
            current: None,
        }
    }

    /// Replaces any existing preview with one for `blob` and shows the action bar.
    pub fn show(&mut self, blob: RecordingBlob) {
        if let Some((element, _url)) = self.current.take() {
            self.audio_box.borrow_mut().remove_child(&element);
        }

        let url = match ObjectUrl::create(&blob) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Failed to create preview source: {}", e);
                None
            }
        };
        let src = url.as_ref().map(ObjectUrl::as_str).unwrap_or_default();

        let audio = el("audio").attr("src", src).attr("controls", true).build();
        self.audio_box.borrow_mut().append(audio.clone());
        self.action_bar.borrow_mut().swap_class(HIDE, SHOW);

        tracing::debug!("Preview ready ({} bytes)", blob.len());
        self.current = Some((audio, url));
        self.pending = Some(blob);
    }

    /// Drops the pending blob and hides the action bar.
    pub fn discard(&mut self) {
        self.pending = None;
        self.action_bar.borrow_mut().swap_class(SHOW, HIDE);
    }

    pub fn pending(&self) -> Option<&RecordingBlob> {
        self.pending.as_ref()
    }

    /// Source of the current preview element, if one could be created.
    pub fn source(&self) -> Option<String> {
        self.current
            .as_ref()
            .and_then(|(_, url)| url.as_ref())
            .map(ObjectUrl::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::element::AttrValue;
    use crate::ui::page::Page;
    use std::path::Path;

    fn blob(bytes: &[u8]) -> RecordingBlob {
        RecordingBlob::new(bytes.to_vec(), "audio/wav", "wav")
    }

    #[test]
    fn test_show_twice_leaves_one_preview() {
        let page = Page::new();
        let mut preview = PreviewController::new(page.audio_box.clone(), page.record_box.clone());

        preview.show(blob(b"first"));
        let first_src = preview.source().unwrap();
        assert!(Path::new(&first_src).exists());

        preview.show(blob(b"second"));
        assert_eq!(page.audio_box.borrow().children().len(), 1);
        assert!(!Path::new(&first_src).exists());

        let second_src = preview.source().unwrap();
        assert_eq!(std::fs::read(&second_src).unwrap(), b"second");
        assert_eq!(preview.pending().unwrap().bytes(), b"second");
        assert!(page.action_bar_visible());
    }

    #[test]
    fn test_show_renders_audio_with_controls() {
        let page = Page::new();
        let mut preview = PreviewController::new(page.audio_box.clone(), page.record_box.clone());
        preview.show(blob(b"x"));

        let audio = page.audio_box.borrow().first_child().unwrap();
        let audio = audio.borrow();
        assert_eq!(audio.tag(), "audio");
        assert_eq!(audio.attr("controls"), Some(&AttrValue::Flag(true)));
        assert_eq!(audio.text_attr("src"), preview.source().as_deref());
    }

    #[test]
    fn test_discard_hides_bar_and_clears_pending() {
        let page = Page::new();
        let mut preview = PreviewController::new(page.audio_box.clone(), page.record_box.clone());
        preview.show(blob(b"x"));

        preview.discard();
        assert!(preview.pending().is_none());
        assert!(!page.action_bar_visible());
        assert!(page.record_box.borrow().has_class(HIDE));
    }
}

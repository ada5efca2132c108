//! The recorder page: fixed control elements and the regions controllers draw into.
//!
//! Control handles are looked up once here and handed to the controllers that
//! need them. [`Page::render`] turns the current tree into terminal text.

use console::style;

use super::element::{el, ElementRef};

/// Icon sources used by the status indicator and playback buttons.
pub mod icons {
    pub const MICROPHONE: &str = "img/microphone.png";
    pub const STOP: &str = "img/stop.png";
    pub const PLAY: &str = "img/play.png";
    pub const PAUSE: &str = "img/pause.png";
}

/// Visibility classes of the save/remove action bar.
pub const HIDE: &str = "hide";
pub const SHOW: &str = "show";

/// Handles to every element the controllers touch.
///
/// The record, save and remove controls are the run loop's menu actions; the
/// page only keeps the elements controllers draw into.
pub struct Page {
    pub record_img: ElementRef,
    pub record_box: ElementRef,
    pub audio_box: ElementRef,
    pub records_box: ElementRef,
}

impl Page {
    /// Builds the page skeleton with the action bar hidden and no records.
    pub fn new() -> Self {
        let record_img = el("img").attr("src", icons::MICROPHONE).build();
        let audio_box = el("div").attr("id", "audio_box").build();
        let record_box = el("div")
            .attr("id", "record_box")
            .class(HIDE)
            .child(el("button").attr("id", "save_btn").text("Save"))
            .child(el("button").attr("id", "remove_btn").text("Remove"))
            .build();
        record_box.borrow_mut().append(audio_box.clone());
        let records_box = el("div").attr("id", "records_box").build();

        Self {
            record_img,
            record_box,
            audio_box,
            records_box,
        }
    }

    /// Whether the save/remove bar is currently visible.
    pub fn action_bar_visible(&self) -> bool {
        self.record_box.borrow().has_class(SHOW)
    }

    pub fn is_recording_indicated(&self) -> bool {
        self.record_img.borrow().text_attr("src") == Some(icons::STOP)
    }

    /// Renders the page as terminal text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let indicator = if self.is_recording_indicated() {
            style("● recording").red().bold().to_string()
        } else {
            style("○ idle").dim().to_string()
        };
        out.push_str(&format!("  {indicator}\n"));

        if self.action_bar_visible() {
            let preview = self
                .audio_box
                .borrow()
                .first_child()
                .and_then(|audio| audio.borrow().text_attr("src").map(str::to_string));
            if let Some(src) = preview {
                out.push_str(&format!("  {} {}\n", style("preview").cyan(), style(src).dim()));
            }
        }

        out.push('\n');
        out.push_str(&format!("  {}\n", style("Records").bold().underlined()));
        for (index, line) in record_lines(&self.records_box).into_iter().enumerate() {
            match line {
                RecordLine::Item { playing, label } => {
                    let marker = if playing { "⏸" } else { "▶" };
                    out.push_str(&format!("  {:>3}. {marker} {label}\n", index + 1));
                }
                RecordLine::Text(text) => {
                    out.push_str(&format!("       {}\n", style(text).italic().dim()));
                }
            }
        }
        out
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

enum RecordLine {
    Item { playing: bool, label: String },
    Text(String),
}

fn record_lines(records_box: &ElementRef) -> Vec<RecordLine> {
    records_box
        .borrow()
        .children()
        .iter()
        .map(|node| {
            let node = node.borrow();
            if node.has_class("audio_item") {
                let mut playing = false;
                let mut label = String::new();
                for child in node.children() {
                    let child = child.borrow();
                    match child.tag() {
                        "button" => {
                            playing = child
                                .first_child()
                                .map(|img| img.borrow().text_attr("src") == Some(icons::PAUSE))
                                .unwrap_or(false);
                        }
                        "p" => {
                            label = child.text_attr("textContent").unwrap_or_default().to_string();
                        }
                        _ => {}
                    }
                }
                RecordLine::Item { playing, label }
            } else {
                RecordLine::Text(node.text_attr("textContent").unwrap_or_default().to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_starts_idle_with_hidden_bar() {
        let page = Page::new();
        assert!(!page.action_bar_visible());
        assert!(!page.is_recording_indicated());
        assert!(page.records_box.borrow().children().is_empty());
        assert!(page.record_box.borrow().has_class(HIDE));

        let bar = page.record_box.borrow();
        let ids: Vec<String> = bar
            .children()
            .iter()
            .map(|c| c.borrow().text_attr("id").unwrap_or_default().to_string())
            .collect();
        assert_eq!(ids, vec!["save_btn", "remove_btn", "audio_box"]);
    }

    #[test]
    fn test_render_lists_items_and_placeholder() {
        let page = Page::new();
        let item = el("div")
            .class("audio_item")
            .child(el("audio").attr("src", "x"))
            .child(el("button").class("btn").child(el("img").attr("src", icons::PAUSE)))
            .child(el("p").text("14.11.2023 - test"))
            .build();
        page.records_box.borrow_mut().append(item);
        page.records_box
            .borrow_mut()
            .append(el("p").text("No records. Create one").build());

        let text = console::strip_ansi_codes(&page.render()).to_string();
        assert!(text.contains("1. ⏸ 14.11.2023 - test"));
        assert!(text.contains("No records. Create one"));
    }
}

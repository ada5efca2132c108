//! Filenames of saved recordings.
//!
//! A recording is stored as `<epoch-millis>` or `<epoch-millis>-<name>`. The
//! timestamp never contains the separator, so parsing splits on its first
//! occurrence and names may contain it freely.

use std::fmt;

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};

pub const SEPARATOR: char = '-';

/// Date format used when none is configured or the configured one is invalid.
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Extensions the memo server may append to stored files.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "webm", "m4a", "flac"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilename {
    timestamp_ms: i64,
    name: Option<String>,
}

impl RecordFilename {
    /// Builds a filename from a creation time and an optional user-supplied name.
    ///
    /// The name is trimmed, path separators are replaced with `_`, and a blank
    /// name counts as no name. A trailing audio extension has its dot
    /// replaced with `_` so parsing does not strip it.
    pub fn new(timestamp_ms: i64, name: Option<&str>) -> Self {
        let name = name.map(sanitize_name).filter(|n| !n.is_empty());
        Self { timestamp_ms, name }
    }

    /// Parses a filename returned by the listing endpoint.
    ///
    /// Returns `None` when the part before the separator is not a timestamp.
    pub fn parse(raw: &str) -> Option<Self> {
        let stem = strip_audio_extension(raw);
        let (timestamp, name) = match stem.split_once(SEPARATOR) {
            Some((timestamp, name)) => (timestamp, Some(name)),
            None => (stem, None),
        };
        if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let timestamp_ms = timestamp.parse().ok()?;
        Some(Self {
            timestamp_ms,
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
        })
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp_ms).single()
    }

    /// Display label: `"<date> - <name>"`, or just the date.
    pub fn label(&self, date_format: &str) -> String {
        let date = self
            .created_at()
            .map(|at| format_date(&at, date_format))
            .unwrap_or_else(|| "Invalid Date".to_string());
        match &self.name {
            Some(name) => format!("{date} - {name}"),
            None => date,
        }
    }
}

impl fmt::Display for RecordFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}{}{}", self.timestamp_ms, SEPARATOR, name),
            None => write!(f, "{}", self.timestamp_ms),
        }
    }
}

fn sanitize_name(name: &str) -> String {
    let mut name = name.trim().replace(['/', '\\'], "_");
    if strip_audio_extension(&name).len() < name.len() {
        if let Some(dot) = name.rfind('.') {
            name.replace_range(dot..=dot, "_");
        }
    }
    name
}

/// Whether `date_format` contains only valid strftime specifiers.
pub fn is_valid_date_format(date_format: &str) -> bool {
    !StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error))
}

/// Formats `at`, falling back to [`DEFAULT_DATE_FORMAT`] if `date_format` is invalid.
fn format_date(at: &DateTime<Local>, date_format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(date_format)).is_ok() {
        return out;
    }
    tracing::warn!("Invalid date format '{}', using the default", date_format);
    at.format(DEFAULT_DATE_FORMAT).to_string()
}

fn strip_audio_extension(raw: &str) -> &str {
    if let Some((stem, ext)) = raw.rsplit_once('.') {
        if AUDIO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)) {
            return stem;
        }
    }
    raw
}

/// Label for a listed file, falling back to the raw name if it does not parse.
pub fn display_label(raw: &str, date_format: &str) -> String {
    match RecordFilename::parse(raw) {
        Some(filename) => filename.label(date_format),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_and_without_name() {
        assert_eq!(
            RecordFilename::new(1700000000000, Some("test")).to_string(),
            "1700000000000-test"
        );
        assert_eq!(RecordFilename::new(1700000000000, None).to_string(), "1700000000000");
        assert_eq!(RecordFilename::new(1700000000000, Some("  ")).to_string(), "1700000000000");
    }

    #[test]
    fn test_round_trip_recovers_timestamp_and_name() {
        for name in ["test", "walk in the park", "café ☕", "x"] {
            let original = RecordFilename::new(1700000000000, Some(name));
            let parsed = RecordFilename::parse(&original.to_string()).unwrap();
            assert_eq!(parsed, original);
            assert_eq!(parsed.name(), Some(name));
            assert!(parsed.created_at().is_some());
        }

        let bare = RecordFilename::parse(&RecordFilename::new(42, None).to_string()).unwrap();
        assert_eq!(bare.timestamp_ms(), 42);
        assert_eq!(bare.name(), None);
    }

    #[test]
    fn test_names_containing_separator_survive() {
        let original = RecordFilename::new(1700000000000, Some("to-do list"));
        let parsed = RecordFilename::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.name(), Some("to-do list"));
    }

    #[test]
    fn test_path_separators_are_replaced() {
        let filename = RecordFilename::new(1, Some("../etc/passwd"));
        assert_eq!(filename.name(), Some(".._etc_passwd"));
    }

    #[test]
    fn test_parse_strips_known_extension_only() {
        let parsed = RecordFilename::parse("1700000000000-memo.mp3").unwrap();
        assert_eq!(parsed.name(), Some("memo"));
        let parsed = RecordFilename::parse("1700000000000-v1.2").unwrap();
        assert_eq!(parsed.name(), Some("v1.2"));
        let parsed = RecordFilename::parse("1700000000000.WAV").unwrap();
        assert_eq!(parsed.name(), None);
    }

    #[test]
    fn test_name_ending_in_audio_extension_round_trips() {
        let original = RecordFilename::new(1700000000000, Some("notes.mp3"));
        assert_eq!(original.name(), Some("notes_mp3"));
        assert_eq!(original.to_string(), "1700000000000-notes_mp3");

        let parsed = RecordFilename::parse(&original.to_string()).unwrap();
        assert_eq!(parsed, original);

        let dotted = RecordFilename::new(1, Some("v1.2 draft"));
        assert_eq!(dotted.name(), Some("v1.2 draft"));
    }

    #[test]
    fn test_invalid_date_format_falls_back_to_default() {
        let filename = RecordFilename::new(1700000000000, Some("test"));
        let expected = filename.label(DEFAULT_DATE_FORMAT);
        assert_eq!(filename.label("%Q"), expected);
        assert_eq!(display_label("1700000000000-test", "%Q"), expected);
    }

    #[test]
    fn test_date_format_validation() {
        assert!(is_valid_date_format(DEFAULT_DATE_FORMAT));
        assert!(is_valid_date_format("%Y-%m-%d"));
        assert!(!is_valid_date_format("%Q"));
    }

    #[test]
    fn test_parse_rejects_non_timestamp() {
        assert!(RecordFilename::parse("notes-today").is_none());
        assert!(RecordFilename::parse("").is_none());
        assert_eq!(display_label("notes-today", "%Y"), "notes-today");
    }

    #[test]
    fn test_label_formats_local_date() {
        let filename = RecordFilename::new(1700000000000, Some("test"));
        let expected_date = Local
            .timestamp_millis_opt(1700000000000)
            .unwrap()
            .format("%Y-%m-%d")
            .to_string();
        assert_eq!(filename.label("%Y-%m-%d"), format!("{expected_date} - test"));
        assert_eq!(
            RecordFilename::new(1700000000000, None).label("%Y-%m-%d"),
            expected_date
        );
    }
}

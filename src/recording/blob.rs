//! Finalized recordings.

/// One finished recording: encoded bytes plus their media type.
///
/// Produced once per completed recording and moved, never cloned, from the
/// capture session to the preview and from there into an upload.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordingBlob {
    bytes: Vec<u8>,
    mime_type: String,
    extension: String,
}

impl RecordingBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            extension: extension.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File extension matching the encoding, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

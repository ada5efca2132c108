//! Microphone capture for voxmemo.
//!
//! A [`CaptureSession`] toggles between idle and recording, buffers the PCM
//! chunks the input device delivers, and finalizes them into a single encoded
//! [`RecordingBlob`] when the device reports that it stopped.

pub mod blob;
pub mod device;
pub mod encoder;
pub mod ffmpeg;
pub mod session;

pub use blob::RecordingBlob;
pub use device::{AudioInput, CpalInput};
pub use encoder::{Encoder, OutputFormat};
pub use session::{CaptureSession, ToggleOutcome};

/// Failures while acquiring the input device or producing a recording.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("audio capture is not supported on this system")]
    Unsupported,
    #[error("access to the audio input device was denied: {0}")]
    PermissionDenied(String),
    #[error("audio input device not found: {0}")]
    DeviceNotFound(String),
    #[error("audio stream error: {0}")]
    Stream(String),
    #[error("failed to encode recording: {0}")]
    Encoding(String),
}

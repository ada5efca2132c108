//! Audio input devices.
//!
//! An [`AudioInput`] hands out exclusive capture streams. Each stream reports
//! through an event channel: zero or more [`DeviceEvent::Data`] chunks in
//! arrival order, then exactly one [`DeviceEvent::Stopped`] once a stop was
//! requested and the device released.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::CaptureError;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// One fragment of mono i16 PCM delivered by the device.
pub type Chunk = Vec<i16>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Data(Chunk),
    Stopped,
}

/// A freshly acquired capture stream and the channel its events arrive on.
pub struct Acquired<S> {
    pub stream: S,
    pub sample_rate: u32,
    pub events: UnboundedReceiver<DeviceEvent>,
}

/// Source of capture streams.
#[allow(async_fn_in_trait)]
pub trait AudioInput {
    type Stream: CaptureStream;

    /// Whether the host offers audio capture at all.
    fn is_supported(&self) -> bool;

    /// Requests exclusive access to the input device and starts capturing.
    async fn acquire(&mut self) -> Result<Acquired<Self::Stream>, CaptureError>;
}

/// A running capture stream.
pub trait CaptureStream {
    /// Asks the device to stop. Completion is signalled by [`DeviceEvent::Stopped`].
    fn request_stop(&mut self);
}

/// Input device backed by cpal.
///
/// `device` is "default", a numeric index from `voxmemo list-devices`, or a device name.
/// Recording always happens at the device's native rate; `requested_sample_rate`
/// only produces a warning when it differs.
pub struct CpalInput {
    device: String,
    requested_sample_rate: u32,
}

impl CpalInput {
    pub fn new(device: impl Into<String>, requested_sample_rate: u32) -> Self {
        Self {
            device: device.into(),
            requested_sample_rate,
        }
    }
}

impl AudioInput for CpalInput {
    type Stream = CpalStream;

    fn is_supported(&self) -> bool {
        suppress_alsa_warnings(|| cpal::default_host().input_devices().is_ok())
    }

    async fn acquire(&mut self) -> Result<Acquired<CpalStream>, CaptureError> {
        let device = suppress_alsa_warnings(|| find_device(&cpal::default_host(), &self.device))?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let supported = device.default_input_config().map_err(|e| match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => {
                CaptureError::DeviceNotFound(device_name.clone())
            }
            cpal::DefaultStreamConfigError::BackendSpecific { err } => {
                CaptureError::PermissionDenied(err.to_string())
            }
            other => CaptureError::Stream(other.to_string()),
        })?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        if sample_rate != self.requested_sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.requested_sample_rate,
                sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            sample_rate,
            channels,
            sample_format
        );

        let (events, receiver) = unbounded_channel();
        let data_events = events.clone();

        let built = match sample_format {
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let _ = data_events.send(DeviceEvent::Data(downmix(data, channels)));
                },
                on_stream_error,
                None,
            ),
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let pcm: Vec<i16> = data.iter().map(|&s| f32_to_i16(s)).collect();
                    let _ = data_events.send(DeviceEvent::Data(downmix(&pcm, channels)));
                },
                on_stream_error,
                None,
            ),
            other => {
                return Err(CaptureError::Stream(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        };

        let stream = built.map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceNotFound(device_name.clone())
            }
            // Backends report refused microphone access this way (e.g. macOS privacy settings)
            cpal::BuildStreamError::BackendSpecific { err } => {
                CaptureError::PermissionDenied(err.to_string())
            }
            other => CaptureError::Stream(other.to_string()),
        })?;

        stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        tracing::debug!("Audio stream started");

        Ok(Acquired {
            stream: CpalStream {
                stream: Some(stream),
                events,
            },
            sample_rate,
            events: receiver,
        })
    }
}

/// Running cpal stream. Dropping the inner stream releases the device.
pub struct CpalStream {
    stream: Option<cpal::Stream>,
    events: UnboundedSender<DeviceEvent>,
}

impl CaptureStream for CpalStream {
    fn request_stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("Audio stream stopped");
        }
        let _ = self.events.send(DeviceEvent::Stopped);
    }
}

fn on_stream_error(err: cpal::StreamError) {
    tracing::error!("Audio stream error: {}", err);
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Converts interleaved multi-channel audio to mono by averaging channels.
pub fn downmix(data: &[i16], channels: usize) -> Chunk {
    match channels {
        0 | 1 => data.to_vec(),
        _ => data
            .chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect(),
    }
}

/// Resolves "default", a numeric index or a device name to an input device.
pub fn find_device(host: &cpal::Host, spec: &str) -> Result<cpal::Device, CaptureError> {
    if spec == "default" {
        return host
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceNotFound("no default input device".to_string()));
    }

    let devices: Vec<cpal::Device> = host
        .input_devices()
        .map_err(|e| CaptureError::Stream(format!("failed to enumerate devices: {e}")))?
        .collect();

    if let Ok(index) = spec.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            CaptureError::DeviceNotFound(format!(
                "index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            ))
        });
    }

    devices
        .into_iter()
        .find(|device| device.name().map(|name| name == spec).unwrap_or(false))
        .ok_or_else(|| {
            CaptureError::DeviceNotFound(format!(
                "'{spec}'. Use 'voxmemo list-devices' to see available devices."
            ))
        })
}

/// Runs `f` with stderr pointed at /dev/null so ALSA does not scribble over the terminal.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    let Ok(dev_null) = OpenOptions::new().write(true).open("/dev/null") else {
        return f();
    };

    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved == -1 {
        return f();
    }
    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(saved) };
        return f();
    }

    let result = f();

    unsafe {
        libc::dup2(saved, libc::STDERR_FILENO);
        libc::close(saved);
    }
    result
}

#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}

#[cfg(test)]
pub mod testing {
    //! Scripted input device for driving the session without hardware.

    use super::*;
    use std::collections::VecDeque;

    pub const SAMPLE_RATE: u32 = 8000;

    /// Each acquisition plays back the next queued take as data events.
    #[derive(Default)]
    pub struct ScriptedInput {
        pub unsupported: bool,
        pub failure: Option<CaptureError>,
        pub takes: VecDeque<Vec<Chunk>>,
        /// Senders of every stream handed out, for emitting chunks mid-recording.
        pub senders: Vec<UnboundedSender<DeviceEvent>>,
        pub acquisitions: usize,
    }

    impl ScriptedInput {
        pub fn with_takes(takes: Vec<Vec<Chunk>>) -> Self {
            Self {
                takes: takes.into(),
                ..Default::default()
            }
        }

        /// Emits a chunk on the most recently acquired stream.
        pub fn speak(&self, chunk: Chunk) {
            if let Some(sender) = self.senders.last() {
                let _ = sender.send(DeviceEvent::Data(chunk));
            }
        }
    }

    pub struct ScriptedStream {
        events: UnboundedSender<DeviceEvent>,
    }

    impl CaptureStream for ScriptedStream {
        fn request_stop(&mut self) {
            let _ = self.events.send(DeviceEvent::Stopped);
        }
    }

    impl AudioInput for ScriptedInput {
        type Stream = ScriptedStream;

        fn is_supported(&self) -> bool {
            !self.unsupported
        }

        async fn acquire(&mut self) -> Result<Acquired<ScriptedStream>, CaptureError> {
            if let Some(err) = self.failure.take() {
                return Err(err);
            }
            self.acquisitions += 1;
            let (events, receiver) = unbounded_channel();
            for chunk in self.takes.pop_front().unwrap_or_default() {
                let _ = events.send(DeviceEvent::Data(chunk));
            }
            self.senders.push(events.clone());
            Ok(Acquired {
                stream: ScriptedStream { events },
                sample_rate: SAMPLE_RATE,
                events: receiver,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_mono_passthrough() {
        assert_eq!(downmix(&[1, -2, 3], 1), vec![1, -2, 3]);
    }

    #[test]
    fn test_downmix_stereo_averages_pairs() {
        assert_eq!(downmix(&[10, 20, -4, 4, 7, 8], 2), vec![15, 0, 7]);
    }

    #[test]
    fn test_downmix_multichannel_drops_partial_frame() {
        assert_eq!(downmix(&[3, 3, 3, 9, 9, 9, 1], 3), vec![3, 9]);
    }

    #[test]
    fn test_f32_conversion_clamps() {
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(-1.0), -i16::MAX);
    }
}

//! The capture session state machine.
//!
//! ```text
//! Idle --toggle/acquire ok--> Recording --toggle/request stop--> (drain until Stopped) --finalize--> Idle
//! ```
//!
//! A failed acquisition leaves the session idle. Finalize runs exactly once per
//! recording and is the only place a [`RecordingBlob`] is created.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

use super::device::{Acquired, AudioInput, CaptureStream, Chunk, DeviceEvent};
use super::encoder::Encoder;
use super::{CaptureError, RecordingBlob};
use crate::ui::element::ElementRef;
use crate::ui::page::icons;

/// Result of one press of the record control.
#[derive(Debug)]
pub enum ToggleOutcome {
    /// Recording started.
    Started,
    /// Recording stopped and was finalized.
    Finished(RecordingBlob),
    /// The request failed; the session is idle.
    Rejected(CaptureError),
}

enum State<S> {
    Idle,
    Recording {
        stream: S,
        sample_rate: u32,
        events: UnboundedReceiver<DeviceEvent>,
        started_at: Instant,
    },
}

/// Owns the input device stream and the chunks of the current recording.
pub struct CaptureSession<A: AudioInput> {
    input: A,
    encoder: Encoder,
    state: State<A::Stream>,
    chunks: Vec<Chunk>,
    indicator: ElementRef,
}

impl<A: AudioInput> CaptureSession<A> {
    /// `indicator` is the image element showing whether a recording is in progress.
    pub fn new(input: A, encoder: Encoder, indicator: ElementRef) -> Self {
        Self {
            input,
            encoder,
            state: State::Idle,
            chunks: Vec::new(),
            indicator,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, State::Recording { .. })
    }

    /// Time since the current recording started.
    pub fn elapsed(&self) -> Option<Duration> {
        match &self.state {
            State::Recording { started_at, .. } => Some(started_at.elapsed()),
            State::Idle => None,
        }
    }

    pub fn buffered_chunks(&self) -> usize {
        self.chunks.len()
    }

    #[cfg(test)]
    pub(crate) fn input_mut(&mut self) -> &mut A {
        &mut self.input
    }

    /// Starts a recording when idle, stops and finalizes it when recording.
    ///
    /// Failures are logged and returned as [`ToggleOutcome::Rejected`].
    pub async fn toggle_recording(&mut self) -> ToggleOutcome {
        if !self.input.is_supported() {
            tracing::warn!("Audio capture not supported");
            return ToggleOutcome::Rejected(CaptureError::Unsupported);
        }

        let next_icon = if self.is_recording() {
            icons::MICROPHONE
        } else {
            icons::STOP
        };
        self.set_indicator(next_icon);

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => self.start().await,
            State::Recording {
                stream,
                sample_rate,
                events,
                started_at,
            } => {
                self.stop(stream, sample_rate, events, started_at)
                    .await
            }
        }
    }

    /// Moves chunks that already arrived into the buffer without blocking.
    ///
    /// If the device stopped on its own the recording is finalized here and
    /// its outcome returned.
    pub fn poll_events(&mut self) -> Option<ToggleOutcome> {
        let State::Recording { events, .. } = &mut self.state else {
            return None;
        };

        let mut stopped = false;
        loop {
            match events.try_recv() {
                Ok(DeviceEvent::Data(chunk)) => self.chunks.push(chunk),
                Ok(DeviceEvent::Stopped) | Err(TryRecvError::Disconnected) => {
                    stopped = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        if !stopped {
            return None;
        }

        tracing::warn!("Input device stopped without a stop request");
        let State::Recording { sample_rate, .. } = std::mem::replace(&mut self.state, State::Idle)
        else {
            return None;
        };
        self.set_indicator(icons::MICROPHONE);
        Some(self.finalize(sample_rate))
    }

    async fn start(&mut self) -> ToggleOutcome {
        match self.input.acquire().await {
            Ok(Acquired {
                stream,
                sample_rate,
                events,
            }) => {
                self.chunks.clear();
                self.state = State::Recording {
                    stream,
                    sample_rate,
                    events,
                    started_at: Instant::now(),
                };
                tracing::info!("Recording started at {}Hz", sample_rate);
                ToggleOutcome::Started
            }
            Err(e) => {
                tracing::error!("Failed to start recording: {}", e);
                self.set_indicator(icons::MICROPHONE);
                ToggleOutcome::Rejected(e)
            }
        }
    }

    async fn stop(
        &mut self,
        mut stream: A::Stream,
        sample_rate: u32,
        mut events: UnboundedReceiver<DeviceEvent>,
        started_at: Instant,
    ) -> ToggleOutcome {
        stream.request_stop();

        while let Some(event) = events.recv().await {
            match event {
                DeviceEvent::Data(chunk) => self.chunks.push(chunk),
                DeviceEvent::Stopped => break,
            }
        }
        drop(stream);

        tracing::info!(
            "Recording stopped after {:.2}s ({} chunks)",
            started_at.elapsed().as_secs_f32(),
            self.chunks.len()
        );
        self.finalize(sample_rate)
    }

    /// Concatenates the buffered chunks into one blob and empties the buffer.
    fn finalize(&mut self, sample_rate: u32) -> ToggleOutcome {
        let chunks = std::mem::take(&mut self.chunks);
        let samples: Vec<i16> = chunks.into_iter().flatten().collect();
        if samples.is_empty() {
            tracing::warn!("Recording stopped with no samples captured");
        }

        match self.encoder.encode(&samples, sample_rate) {
            Ok(blob) => {
                tracing::info!(
                    "Recording finalized: {} samples, {} bytes ({})",
                    samples.len(),
                    blob.len(),
                    blob.mime_type()
                );
                ToggleOutcome::Finished(blob)
            }
            Err(e) => {
                tracing::error!("Failed to finalize recording: {}", e);
                ToggleOutcome::Rejected(e)
            }
        }
    }

    fn set_indicator(&self, src: &str) {
        self.indicator.borrow_mut().set_attr("src", src);
    }
}

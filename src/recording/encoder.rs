//! Encoding buffered PCM into a [`RecordingBlob`].
//!
//! WAV is written in memory with hound. Any other output format is produced
//! by handing a temporary WAV to ffmpeg, e.g. `mp3 -ab 32k` or `libopus`.

use std::io::Cursor;
use std::path::PathBuf;
use std::process::Command;

use super::ffmpeg::find_ffmpeg;
use super::{CaptureError, RecordingBlob};

/// Target encoding of finalized recordings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Wav,
    /// ffmpeg codec plus extra ffmpeg arguments.
    Ffmpeg { codec: String, args: Vec<String> },
}

impl OutputFormat {
    /// Parses `"wav"` or an ffmpeg format string `"codec [options]"`.
    pub fn parse(spec: &str) -> Result<Self, CaptureError> {
        let mut parts = spec.split_whitespace();
        let codec = parts
            .next()
            .ok_or_else(|| CaptureError::Encoding("empty output format".to_string()))?;
        if codec == "wav" || codec == "pcm_s16le" {
            return Ok(Self::Wav);
        }
        Ok(Self::Ffmpeg {
            codec: codec.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }

    pub fn extension(&self) -> &str {
        match self {
            Self::Wav => "wav",
            Self::Ffmpeg { codec, .. } => match codec.as_str() {
                "libmp3lame" => "mp3",
                "libopus" | "libvorbis" => "ogg",
                "aac" => "m4a",
                other => other,
            },
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self.extension() {
            "wav" => "audio/wav",
            "mp3" => "audio/mpeg",
            "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            "m4a" => "audio/mp4",
            "webm" => "audio/webm",
            _ => "application/octet-stream",
        }
    }
}

/// Turns mono i16 samples into an encoded blob.
#[derive(Debug, Clone)]
pub struct Encoder {
    format: OutputFormat,
}

impl Encoder {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn encode(&self, samples: &[i16], sample_rate: u32) -> Result<RecordingBlob, CaptureError> {
        let wav = encode_wav(samples, sample_rate)
            .map_err(|e| CaptureError::Encoding(e.to_string()))?;

        let bytes = match &self.format {
            OutputFormat::Wav => wav,
            OutputFormat::Ffmpeg { codec, args } => {
                transcode(&wav, codec, args, self.format.extension())?
            }
        };

        tracing::debug!(
            "Encoded {} samples at {}Hz into {} bytes of {}",
            samples.len(),
            sample_rate,
            bytes.len(),
            self.format.mime_type()
        );
        Ok(RecordingBlob::new(
            bytes,
            self.format.mime_type(),
            self.format.extension(),
        ))
    }
}

fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Converts an in-memory WAV with ffmpeg, going through temp files.
fn transcode(
    wav: &[u8],
    codec: &str,
    args: &[String],
    extension: &str,
) -> Result<Vec<u8>, CaptureError> {
    let ffmpeg = find_ffmpeg().ok_or_else(|| {
        CaptureError::Encoding(format!(
            "ffmpeg is required for the '{codec}' output format but was not found"
        ))
    })?;

    let input = temp_path("wav");
    let output = temp_path(extension);
    std::fs::write(&input, wav).map_err(|e| CaptureError::Encoding(e.to_string()))?;

    let result = Command::new(&ffmpeg)
        .args(["-loglevel", "error", "-y", "-i"])
        .arg(&input)
        .args(["-acodec", codec, "-ac", "1"])
        .args(args)
        .arg(&output)
        .output();

    let encoded = match result {
        Ok(out) if out.status.success() => {
            std::fs::read(&output).map_err(|e| CaptureError::Encoding(e.to_string()))
        }
        Ok(out) => Err(CaptureError::Encoding(
            String::from_utf8_lossy(&out.stderr).trim().to_string(),
        )),
        Err(e) => Err(CaptureError::Encoding(format!("failed to run ffmpeg: {e}"))),
    };

    for path in [&input, &output] {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::debug!("Failed to remove temp file {}: {}", path.display(), e);
        }
    }
    encoded
}

fn temp_path(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "voxmemo_encode_{}.{extension}",
        std::process::id()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_formats() {
        assert_eq!(OutputFormat::parse("wav").unwrap(), OutputFormat::Wav);
        assert_eq!(
            OutputFormat::parse("mp3 -ab 32k").unwrap(),
            OutputFormat::Ffmpeg {
                codec: "mp3".to_string(),
                args: vec!["-ab".to_string(), "32k".to_string()],
            }
        );
        assert!(OutputFormat::parse("   ").is_err());
    }

    #[test]
    fn test_mime_types_follow_codec() {
        assert_eq!(OutputFormat::Wav.mime_type(), "audio/wav");
        assert_eq!(OutputFormat::parse("mp3").unwrap().mime_type(), "audio/mpeg");
        let opus = OutputFormat::parse("libopus").unwrap();
        assert_eq!(opus.extension(), "ogg");
        assert_eq!(opus.mime_type(), "audio/ogg");
    }

    #[test]
    fn test_wav_blob_decodes_to_same_samples() {
        let samples = vec![0i16, 100, -100, i16::MAX, i16::MIN];
        let blob = Encoder::new(OutputFormat::Wav).encode(&samples, 16000).unwrap();
        assert_eq!(blob.mime_type(), "audio/wav");
        assert_eq!(blob.extension(), "wav");

        let reader = hound::WavReader::new(Cursor::new(blob.bytes().to_vec())).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        let decoded: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_empty_recording_is_header_only_wav() {
        let blob = Encoder::new(OutputFormat::Wav).encode(&[], 8000).unwrap();
        assert_eq!(blob.len(), 44);
    }
}

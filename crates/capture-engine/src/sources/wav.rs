//! WAV-file audio source.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::source::{rms, AudioSource, CaptureError};

/// Samples per analysis window.
pub const WINDOW_SIZE: usize = 512;

/// Mono PCM played back against the host clock.
///
/// Each read returns the RMS of the `WINDOW_SIZE` samples that end at the
/// current playback position. Past the end of the file the window is silent.
#[derive(Debug, Clone)]
pub struct WavAudioSource {
    samples: Vec<f32>,
    sample_rate: u32,
    start_ms: Option<f64>,
    position: usize,
}

impl WavAudioSource {
    /// Decode a WAV file, downmixing to mono and normalizing to `[-1, 1]`.
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let reader = WavReader::open(path)
            .map_err(|e| CaptureError::Decode(format!("{}: {e}", path.display())))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CaptureError::Decode(format!("Failed to read samples: {e}")))?,
            SampleFormat::Int => {
                let max_val = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| CaptureError::Decode(format!("Failed to read samples: {e}")))?
            }
        };

        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        tracing::debug!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            channels,
            samples = samples.len(),
            "Loaded audio track"
        );

        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    /// Wrap mono samples already normalized to `[-1, 1]`.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate: sample_rate.max(1),
            start_ms: None,
            position: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_ms(&self) -> f64 {
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Playback position in samples.
    pub fn position(&self) -> usize {
        self.position
    }

    fn window(&self) -> &[f32] {
        if self.position > self.samples.len() {
            return &[];
        }
        let start = self.position.saturating_sub(WINDOW_SIZE);
        &self.samples[start..self.position]
    }
}

impl AudioSource for WavAudioSource {
    fn available(&self) -> bool {
        !self.samples.is_empty()
    }

    fn read_rms_window(&mut self) -> f64 {
        rms(self.window())
    }

    fn advance_to(&mut self, now_ms: f64) {
        let start = *self.start_ms.get_or_insert(now_ms);
        let elapsed = (now_ms - start).max(0.0);
        self.position = (elapsed * self.sample_rate as f64 / 1000.0) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_before_playback_and_after_end() {
        let mut source = WavAudioSource::from_samples(vec![0.5; 8000], 8000);
        assert!(source.available());
        assert_eq!(source.read_rms_window(), 0.0);

        source.advance_to(0.0);
        source.advance_to(500.0);
        assert_eq!(source.position(), 4000);
        assert!((source.read_rms_window() - 0.5).abs() < 1e-6);

        source.advance_to(2000.0);
        assert_eq!(source.read_rms_window(), 0.0);
    }

    #[test]
    fn window_tracks_loud_section() {
        let mut samples = vec![0.0f32; 16000];
        for s in &mut samples[8000..] {
            *s = 0.8;
        }
        let mut source = WavAudioSource::from_samples(samples, 16000);
        source.advance_to(100.0);
        source.advance_to(400.0);
        assert_eq!(source.read_rms_window(), 0.0);
        source.advance_to(700.0);
        assert!((source.read_rms_window() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn reads_int_wav_as_mono() {
        let path = std::env::temp_dir().join("trustcall_test_stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..4000 {
            writer.write_sample(i16::MAX / 2).unwrap();
            writer.write_sample(i16::MAX / 2).unwrap();
        }
        writer.finalize().unwrap();

        let mut source = WavAudioSource::open(&path).unwrap();
        assert_eq!(source.sample_rate(), 8000);
        assert!((source.duration_ms() - 500.0).abs() < 1e-9);
        source.advance_to(0.0);
        source.advance_to(250.0);
        assert!((source.read_rms_window() - 0.5).abs() < 1e-3);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = WavAudioSource::open(Path::new("/nonexistent/trustcall.wav")).unwrap_err();
        assert!(matches!(err, CaptureError::Decode(_)));
    }
}

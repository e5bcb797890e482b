//! Per-stream feature extraction.
//!
//! [`FeatureExtractor::extract`] turns one sampled raster (plus an optional
//! audio RMS reading) into an [`Observation`], updating the stream's
//! [`AnalyzerState`] along the way. Every numeric edge case resolves to a
//! defined neutral value; extraction itself never fails.

use trustcall_signal_model::observation::Observation;
use trustcall_signal_model::raster::Raster;

use crate::color::{color_suspicion, SkinMoments};
use crate::correlation::{pearson, MIN_PAIRS};
use crate::luma::{motion_energy, LumaFrame, REPEAT_MOTION_THRESHOLD};
use crate::mouth::{roi_motion, RoiBox, RoiPatch};
use crate::ring::RingBuffer;
use crate::texture::{laplacian_variance, texture_suspicion};

/// Capacity of the motion and audio histories.
pub const HISTORY_CAPACITY: usize = 64;

/// Mutable analysis state for one tracked stream.
///
/// Owned by exactly one scheduler entry; created cold on attach and dropped
/// on detach.
#[derive(Debug, Clone)]
pub struct AnalyzerState {
    prev_grayscale: Option<LumaFrame>,
    prev_roi: Option<RoiPatch>,
    repeat_count: u64,
    total_frames: u64,
    motion_history: RingBuffer<f64>,
    audio_history: RingBuffer<f64>,
    has_audio: bool,
}

impl AnalyzerState {
    /// Create a cold state. `has_audio` is fixed for the stream's lifetime.
    pub fn new(has_audio: bool) -> Self {
        Self {
            prev_grayscale: None,
            prev_roi: None,
            repeat_count: 0,
            total_frames: 0,
            motion_history: RingBuffer::new(HISTORY_CAPACITY),
            audio_history: RingBuffer::new(HISTORY_CAPACITY),
            has_audio,
        }
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    pub fn repeat_count(&self) -> u64 {
        self.repeat_count
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Lifetime fraction of frames classified as repeats.
    pub fn frame_repeat_ratio(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        (self.repeat_count as f64 / self.total_frames as f64).clamp(0.0, 1.0)
    }

    pub fn motion_history(&self) -> &RingBuffer<f64> {
        &self.motion_history
    }

    pub fn audio_history(&self) -> &RingBuffer<f64> {
        &self.audio_history
    }
}

/// Raw per-frame measurements behind an observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameFeatures {
    /// Whole-frame motion energy in `[0, 1]`.
    pub motion: f64,
    pub is_repeat: bool,
    pub laplacian_variance: f64,
    pub skin_pixels: u64,
    /// R/G correlation across skin, when there was enough skin.
    pub corr_rg: Option<f64>,
    /// Mouth-proxy motion in `[0, 1]`.
    pub roi_motion: f64,
    /// Audio RMS pushed this frame, if any.
    pub audio_rms: Option<f64>,
}

/// Stateless feature extractor; all per-stream memory lives in
/// [`AnalyzerState`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract one observation, updating `state`.
    pub fn extract(
        &self,
        raster: &Raster,
        audio_rms: Option<f64>,
        state: &mut AnalyzerState,
    ) -> Observation {
        self.extract_with_features(raster, audio_rms, state).0
    }

    /// Like [`extract`](Self::extract), also returning the raw measurements.
    pub fn extract_with_features(
        &self,
        raster: &Raster,
        audio_rms: Option<f64>,
        state: &mut AnalyzerState,
    ) -> (Observation, FrameFeatures) {
        let gray = LumaFrame::from_raster(raster);

        // Motion and frame repeats. A previous frame of a different shape
        // is treated as absent.
        let motion = state
            .prev_grayscale
            .as_ref()
            .and_then(|prev| motion_energy(&gray, prev))
            .unwrap_or(0.0);
        let is_repeat = motion < REPEAT_MOTION_THRESHOLD;
        if is_repeat {
            state.repeat_count += 1;
        }
        state.total_frames += 1;
        let frame_repeat_ratio = state.frame_repeat_ratio();

        // Texture regularity.
        let lap_var = laplacian_variance(&gray);
        let tex_susp = texture_suspicion(lap_var);

        // Skin-tone channel coupling.
        let moments = SkinMoments::from_raster(raster);
        let color_susp = color_suspicion(&moments);

        // Mouth-motion proxy.
        let roi = RoiBox::mouth(gray.width(), gray.height());
        let patch = RoiPatch::extract(&gray, roi);
        let mouth_motion = roi_motion(&patch, state.prev_roi.as_ref());
        state.prev_roi = Some(patch);
        state.motion_history.push(mouth_motion);
        state.prev_grayscale = Some(gray);

        // Audio is only read for streams that had a track at attach time.
        let audio_rms = if state.has_audio {
            audio_rms.map(|rms| if rms.is_finite() { rms.clamp(0.0, 1.0) } else { 0.0 })
        } else {
            None
        };
        if let Some(rms) = audio_rms {
            state.audio_history.push(rms);
        }

        let av_mismatch = if state.has_audio {
            av_mismatch(&state.motion_history, &state.audio_history)
        } else {
            0.0
        };

        let features = FrameFeatures {
            motion,
            is_repeat,
            laplacian_variance: lap_var,
            skin_pixels: moments.count,
            corr_rg: moments.correlation(),
            roi_motion: mouth_motion,
            audio_rms,
        };

        tracing::trace!(
            motion = features.motion,
            laplacian_var = features.laplacian_variance,
            skin_pixels = features.skin_pixels,
            corr_rg = ?features.corr_rg,
            roi_motion = features.roi_motion,
            "Extracted frame features"
        );

        let observation = Observation::new(
            tex_susp,
            color_susp,
            frame_repeat_ratio,
            av_mismatch,
            state.has_audio,
        );
        (observation, features)
    }
}

/// `1 - |pearson(motion, audio)|` once both histories hold enough pairs.
fn av_mismatch(motion: &RingBuffer<f64>, audio: &RingBuffer<f64>) -> f64 {
    if motion.len().min(audio.len()) < MIN_PAIRS {
        return 0.0;
    }
    let x = motion.to_vec();
    let y = audio.to_vec();
    1.0 - pearson(&x, &y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustcall_signal_model::raster::{SAMPLE_HEIGHT, SAMPLE_WIDTH};

    fn flat(rgb: [u8; 3]) -> Raster {
        Raster::filled(SAMPLE_WIDTH, SAMPLE_HEIGHT, [rgb[0], rgb[1], rgb[2], 255]).unwrap()
    }

    /// Flat frame with the mouth box painted at a given gray level.
    fn mouth_frame(level: u8) -> Raster {
        let mut raster = flat([60, 60, 60]);
        let roi = RoiBox::mouth(SAMPLE_WIDTH, SAMPLE_HEIGHT);
        for y in roi.y0..roi.y1 {
            for x in roi.x0..roi.x1 {
                raster.set_pixel(x as u32, y as u32, [level, level, level, 255]);
            }
        }
        raster
    }

    #[test]
    fn first_frame_is_counted_as_repeat() {
        let extractor = FeatureExtractor::new();
        let mut state = AnalyzerState::new(false);
        let (obs, features) = extractor.extract_with_features(&flat([10, 20, 30]), None, &mut state);
        assert_eq!(features.motion, 0.0);
        assert!(features.is_repeat);
        assert_eq!(state.total_frames(), 1);
        assert_eq!(obs.frame_repeat_ratio, 1.0);
    }

    #[test]
    fn moving_frames_lower_repeat_ratio() {
        let extractor = FeatureExtractor::new();
        let mut state = AnalyzerState::new(false);
        for i in 0..10u8 {
            let level = if i % 2 == 0 { 20 } else { 220 };
            extractor.extract(&flat([level, level, level]), None, &mut state);
        }
        assert_eq!(state.total_frames(), 10);
        assert_eq!(state.repeat_count(), 1);
        assert!((state.frame_repeat_ratio() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn audio_is_ignored_without_track() {
        let extractor = FeatureExtractor::new();
        let mut state = AnalyzerState::new(false);
        for _ in 0..20 {
            let obs = extractor.extract(&mouth_frame(100), Some(0.5), &mut state);
            assert_eq!(obs.av_mismatch, 0.0);
            assert!(!obs.has_audio);
        }
        assert!(state.audio_history().is_empty());
        assert_eq!(state.motion_history().len(), 20);
    }

    #[test]
    fn synchronized_audio_has_low_mismatch() {
        let extractor = FeatureExtractor::new();
        let mut state = AnalyzerState::new(true);
        let mut last = Observation::new(0.0, 0.0, 0.0, 0.0, true);
        // Mouth alternates open/closed; audio is loud exactly when it moves.
        let levels = [60u8, 160, 60, 60, 160, 160, 60, 160, 60, 60, 160, 60];
        let mut prev = 60u8;
        for &level in &levels {
            let rms = if level != prev { 0.8 } else { 0.05 };
            last = extractor.extract(&mouth_frame(level), Some(rms), &mut state);
            prev = level;
        }
        assert!(last.has_audio);
        assert!(last.av_mismatch < 0.05, "mismatch {}", last.av_mismatch);
    }

    #[test]
    fn unrelated_audio_has_high_mismatch() {
        let extractor = FeatureExtractor::new();
        let mut state = AnalyzerState::new(true);
        let mut last = Observation::new(0.0, 0.0, 0.0, 0.0, true);
        // Mouth never moves after the first frame; audio varies.
        for i in 0..16 {
            let rms = if i % 3 == 0 { 0.9 } else { 0.1 };
            last = extractor.extract(&mouth_frame(90), Some(rms), &mut state);
        }
        assert!(last.av_mismatch > 0.99);
    }

    #[test]
    fn mismatch_waits_for_enough_pairs() {
        let extractor = FeatureExtractor::new();
        let mut state = AnalyzerState::new(true);
        for i in 0..5 {
            let obs = extractor.extract(&mouth_frame(60 + i * 30), Some(0.9), &mut state);
            assert_eq!(obs.av_mismatch, 0.0);
        }
    }

    #[test]
    fn observation_fields_stay_in_range() {
        let extractor = FeatureExtractor::new();
        let mut state = AnalyzerState::new(true);
        let mut raster = flat([210, 150, 120]);
        for i in 0..40u32 {
            raster.set_pixel(i, i, [255, 0, 255, 255]);
            let obs = extractor.extract(&raster, Some(f64::NAN), &mut state);
            for v in [
                obs.tex_susp,
                obs.color_susp,
                obs.frame_repeat_ratio,
                obs.av_mismatch,
            ] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}

//! Frame and audio source capabilities.
//!
//! The scheduler never talks to a decoder directly. Hosts wrap whatever
//! produces frames (a media element, a decoder, a file sequence) in a
//! [`FrameSource`], and optionally pair it with an [`AudioSource`].

use trustcall_common::error::TrustcallError;
use trustcall_signal_model::raster::{Raster, RasterError};

/// Errors raised while reading pixels or samples from a source.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The source has no decoded frame yet.
    #[error("source has no decoded frame yet")]
    NotReady,

    /// Pixel read-back is forbidden by the source's origin policy.
    #[error("pixel read-back blocked: {0}")]
    Blocked(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CaptureError> for TrustcallError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::Blocked(message) => TrustcallError::capture_blocked(message),
            CaptureError::Encode(message) => TrustcallError::snapshot(message),
            CaptureError::Io(e) => TrustcallError::Io(e),
            other => TrustcallError::capture(other.to_string()),
        }
    }
}

/// Full-resolution RGBA frame returned for snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// A drawable video frame source.
pub trait FrameSource {
    /// Whether a decoded frame is available to draw.
    fn is_ready(&self) -> bool;

    /// Scale the current frame into `raster`, overwriting every pixel.
    fn draw_into(&mut self, raster: &mut Raster) -> Result<(), CaptureError>;

    /// On-screen size of the source, used to skip thumbnails.
    fn display_size(&self) -> (u32, u32);

    /// Current frame at the source's native resolution.
    fn capture_full(&mut self) -> Result<FullFrame, CaptureError>;

    /// Advance live playback to the host timestamp. Sources that decode on
    /// their own clock can ignore this.
    fn advance_to(&mut self, _now_ms: f64) {}

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Optional audio paired with a frame source.
pub trait AudioSource {
    /// Whether an audio track exists and its analysis graph initialised.
    fn available(&self) -> bool;

    /// RMS amplitude of the current time-domain window, in `[0, 1]`.
    fn read_rms_window(&mut self) -> f64;

    /// Advance live playback to the host timestamp.
    fn advance_to(&mut self, _now_ms: f64) {}
}

/// RMS of samples already normalized to `[-1, 1]`, clamped to `[0, 1]`.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt().clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_silence_and_full_scale() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0.0; 64]), 0.0);
        assert!((rms(&[1.0, -1.0, 1.0, -1.0]) - 1.0).abs() < 1e-12);
        assert!((rms(&[0.5; 10]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn blocked_maps_to_capture_blocked() {
        let err: TrustcallError = CaptureError::Blocked("cross-origin".into()).into();
        assert!(matches!(err, TrustcallError::CaptureBlocked { .. }));
    }
}

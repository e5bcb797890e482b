//! Offline sources that replay recorded media as if it were live.
//!
//! Both sources follow the host clock passed to `advance_to`, so a replay
//! driven by a simulated 60 Hz clock is fully deterministic.

pub mod image_sequence;
pub mod wav;

pub use image_sequence::{FrameSequence, ImageSequenceSource};
pub use wav::WavAudioSource;

//! TrustCall Processing Core
//!
//! Turns sampled frames into suspicion scores without any trained model:
//! - **Luma & motion:** Integer luma projection, frame-repeat detection
//! - **Texture:** Laplacian variance band check
//! - **Color:** Skin-tone red/green correlation
//! - **AV sync:** Mouth-region motion vs audio RMS correlation
//! - **Fusion:** Weighted 0-100 score with audio-less redistribution
//!
//! This crate is pure computation with no I/O and no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod color;
pub mod correlation;
pub mod extractor;
pub mod fusion;
pub mod luma;
pub mod mouth;
pub mod perturb;
pub mod ring;
pub mod texture;

pub use correlation::pearson;
pub use extractor::{AnalyzerState, FeatureExtractor, FrameFeatures};
pub use fusion::{fuse, FusedSample, ScoreFusion};
pub use perturb::{NoPerturbation, Perturbation, RandomSpikes};
pub use ring::RingBuffer;

//! Per-sample observations and fused scores.

use serde::{Deserialize, Serialize};

use crate::stream::StreamId;
use crate::weights::ScoringWeights;

/// Score at or above which a stream is at least medium risk.
pub const MEDIUM_RISK_FLOOR: f64 = 30.0;

/// Sub-scores extracted from one sampled frame.
///
/// Every float is in `[0.0, 1.0]`. `av_mismatch` is exactly `0.0` when
/// `has_audio` is false.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Texture-regularity suspicion.
    pub tex_susp: f64,
    /// Skin-tone channel-correlation anomaly.
    pub color_susp: f64,
    /// Lifetime fraction of near-static frames.
    pub frame_repeat_ratio: f64,
    /// Audio/visual sync deficiency.
    pub av_mismatch: f64,
    pub has_audio: bool,
}

impl Observation {
    /// Build an observation, clamping sub-scores into range and zeroing
    /// the AV mismatch for audio-less streams.
    pub fn new(
        tex_susp: f64,
        color_susp: f64,
        frame_repeat_ratio: f64,
        av_mismatch: f64,
        has_audio: bool,
    ) -> Self {
        Self {
            tex_susp: clamp01(tex_susp),
            color_susp: clamp01(color_susp),
            frame_repeat_ratio: clamp01(frame_repeat_ratio),
            av_mismatch: if has_audio { clamp01(av_mismatch) } else { 0.0 },
            has_audio,
        }
    }
}

/// Consumer-side risk band for a fused score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band a 0-100 score against the configured high-risk threshold.
    pub fn from_score(score: f64, red_threshold: f64) -> Self {
        if score >= red_threshold {
            Self::High
        } else if score >= MEDIUM_RISK_FLOOR {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "GREEN",
            Self::Medium => "AMBER",
            Self::High => "RED",
        }
    }
}

/// What a sink receives for every tick that actually sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredObservation {
    pub stream_id: StreamId,

    /// Per-stream emission counter, starting at 0.
    pub sequence: u64,

    /// Host timestamp of the sampling tick.
    pub timestamp_ms: f64,

    /// Sub-scores as fused (after any demo perturbation).
    pub observation: Observation,

    /// Fused score in `[0, 100]`.
    pub score: f64,

    pub weights: ScoringWeights,

    pub risk: RiskLevel,

    /// Whether demo perturbation altered this sample.
    #[serde(default)]
    pub perturbed: bool,
}

fn clamp01(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

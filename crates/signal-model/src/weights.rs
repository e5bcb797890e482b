//! Fusion weights.

use serde::{Deserialize, Serialize};

/// Per-sub-score weights used by score fusion.
///
/// Weights are non-negative and sum to exactly `1.0` (evaluated as
/// `tex + col + rep + av`) whenever they are handed out by this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub tex: f64,
    pub col: f64,
    pub rep: f64,
    pub av: f64,
}

impl ScoringWeights {
    /// Base weights for a stream with audio.
    pub const BASE: Self = Self {
        tex: 0.35,
        col: 0.25,
        rep: 0.20,
        av: 0.20,
    };

    /// Weights to use for a stream, redistributing the AV share evenly
    /// across the other three sub-scores when there is no audio.
    pub fn for_stream(has_audio: bool) -> Self {
        if has_audio {
            Self::BASE
        } else {
            Self::BASE.without_audio()
        }
    }

    /// Move the AV weight onto the visual sub-scores in equal thirds.
    pub fn without_audio(self) -> Self {
        let k = self.av / 3.0;
        let tex = self.tex + k;
        let col = self.col + k;
        // `rep` absorbs rounding residue so the sum stays bit-exact.
        let rep = 1.0 - (tex + col);
        Self {
            tex,
            col,
            rep,
            av: 0.0,
        }
    }

    pub fn sum(&self) -> f64 {
        self.tex + self.col + self.rep + self.av
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::BASE
    }
}

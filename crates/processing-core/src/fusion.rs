//! Score fusion.
//!
//! `score = 100 * clamp(w_tex*tex + w_col*col + w_rep*rep + w_av*av, 0, 1)`
//! with the AV weight redistributed for audio-less streams.

use trustcall_signal_model::observation::Observation;
use trustcall_signal_model::weights::ScoringWeights;

use crate::perturb::{NoPerturbation, Perturbation};

/// Deterministic fusion of one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedScore {
    /// Score in `[0, 100]`.
    pub score: f64,
    pub weights: ScoringWeights,
}

/// Fuse sub-scores into a single 0-100 score.
pub fn fuse(observation: &Observation) -> FusedScore {
    let w = ScoringWeights::for_stream(observation.has_audio);
    let raw = w.tex * observation.tex_susp
        + w.col * observation.color_susp
        + w.rep * observation.frame_repeat_ratio
        + w.av * observation.av_mismatch;
    FusedScore {
        score: 100.0 * raw.clamp(0.0, 1.0),
        weights: w,
    }
}

/// Result of fusing one tick's observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedSample {
    /// Sub-scores actually fused (perturbed when `perturbed` is set).
    pub observation: Observation,
    pub score: f64,
    pub weights: ScoringWeights,
    pub perturbed: bool,
}

/// Fusion stage with an injectable demo perturbation.
pub struct ScoreFusion {
    perturbation: Box<dyn Perturbation>,
}

impl ScoreFusion {
    /// Fusion without any perturbation.
    pub fn new() -> Self {
        Self::with_perturbation(Box::new(NoPerturbation))
    }

    pub fn with_perturbation(perturbation: Box<dyn Perturbation>) -> Self {
        Self { perturbation }
    }

    pub fn perturbation_name(&self) -> &str {
        self.perturbation.name()
    }

    /// Reseed the perturbation's random stream.
    pub fn reseed(&mut self, seed: Option<u64>) {
        self.perturbation.reseed(seed);
    }

    /// Fuse an observation. The perturbation hook only runs when
    /// `demo_mode` is set.
    pub fn fuse(&mut self, observation: Observation, demo_mode: bool) -> FusedSample {
        let perturbed = if demo_mode {
            self.perturbation.perturb(&observation)
        } else {
            None
        };
        let (observation, perturbed) = match perturbed {
            Some(spiked) => (spiked, true),
            None => (observation, false),
        };
        let fused = fuse(&observation);
        FusedSample {
            observation,
            score: fused.score,
            weights: fused.weights,
            perturbed,
        }
    }
}

impl Default for ScoreFusion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perturb::RandomSpikes;
    use proptest::prelude::*;

    #[test]
    fn all_zero_is_zero() {
        let fused = fuse(&Observation::new(0.0, 0.0, 0.0, 0.0, true));
        assert_eq!(fused.score, 0.0);
    }

    #[test]
    fn all_one_is_hundred() {
        assert!((fuse(&Observation::new(1.0, 1.0, 1.0, 1.0, true)).score - 100.0).abs() < 1e-9);
        assert!((fuse(&Observation::new(1.0, 1.0, 1.0, 0.0, false)).score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_sum_with_audio() {
        let fused = fuse(&Observation::new(1.0, 0.0, 0.5, 0.5, true));
        // 0.35 + 0.20 * 0.5 + 0.20 * 0.5
        assert!((fused.score - 55.0).abs() < 1e-9);
        assert_eq!(fused.weights, ScoringWeights::BASE);
    }

    #[test]
    fn audio_less_fusion_drops_av_weight() {
        let fused = fuse(&Observation::new(1.0, 0.1, 0.0, 0.0, false));
        assert_eq!(fused.weights.av, 0.0);
        let expected = 100.0 * ((0.35 + 0.2 / 3.0) + 0.1 * (0.25 + 0.2 / 3.0));
        assert!((fused.score - expected).abs() < 1e-9);
    }

    #[test]
    fn demo_off_never_perturbs() {
        let mut fusion =
            ScoreFusion::with_perturbation(Box::new(RandomSpikes::seeded(3).with_probability(1.0)));
        let obs = Observation::new(0.1, 0.1, 0.1, 0.0, false);
        for _ in 0..20 {
            let sample = fusion.fuse(obs, false);
            assert!(!sample.perturbed);
            assert_eq!(sample.observation, obs);
            assert_eq!(sample.score, fuse(&obs).score);
        }
    }

    #[test]
    fn demo_on_uses_perturbed_scores() {
        let mut fusion =
            ScoreFusion::with_perturbation(Box::new(RandomSpikes::seeded(3).with_probability(1.0)));
        let obs = Observation::new(0.1, 0.1, 0.1, 0.0, false);
        let sample = fusion.fuse(obs, true);
        assert!(sample.perturbed);
        assert!(sample.score >= fuse(&obs).score);
        assert_eq!(sample.score, fuse(&sample.observation).score);
    }

    #[test]
    fn default_fusion_is_unperturbed_in_demo_mode() {
        let mut fusion = ScoreFusion::default();
        let obs = Observation::new(0.4, 0.2, 0.6, 0.3, true);
        let sample = fusion.fuse(obs, true);
        assert!(!sample.perturbed);
        assert_eq!(fusion.perturbation_name(), "none");
    }

    proptest! {
        #[test]
        fn score_is_bounded(
            tex in 0.0f64..=1.0,
            col in 0.0f64..=1.0,
            rep in 0.0f64..=1.0,
            av in 0.0f64..=1.0,
            has_audio in any::<bool>(),
        ) {
            let fused = fuse(&Observation::new(tex, col, rep, av, has_audio));
            prop_assert!((0.0..=100.0).contains(&fused.score));
            prop_assert_eq!(fused.weights.sum(), 1.0);
            if !has_audio {
                prop_assert_eq!(fused.weights.av, 0.0);
            }
        }
    }
}

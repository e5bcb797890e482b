//! Demo-mode stress perturbation.
//!
//! Used only to exercise score consumers with occasional spikes. The
//! perturbation is injected into [`ScoreFusion`](crate::fusion::ScoreFusion)
//! and runs before the fusion formula, never inside it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trustcall_signal_model::observation::Observation;

/// A hook that may nudge sub-scores before fusion.
pub trait Perturbation: Send {
    /// Return a perturbed copy, or `None` to leave the observation alone.
    fn perturb(&mut self, observation: &Observation) -> Option<Observation>;

    /// Name for logging.
    fn name(&self) -> &str;

    /// Restart any random stream from `seed` (entropy when `None`).
    fn reseed(&mut self, _seed: Option<u64>) {}
}

/// Never perturbs. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPerturbation;

impl Perturbation for NoPerturbation {
    fn perturb(&mut self, _observation: &Observation) -> Option<Observation> {
        None
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Random upward spikes on the visual sub-scores.
#[derive(Debug, Clone)]
pub struct RandomSpikes {
    rng: StdRng,
    /// Per-tick probability of a spike.
    probability: f64,
    /// Upper bound (exclusive) of the uniform boost added to each sub-score.
    max_boost: f64,
}

impl RandomSpikes {
    pub const DEFAULT_PROBABILITY: f64 = 0.02;
    pub const DEFAULT_MAX_BOOST: f64 = 0.5;

    /// Deterministic spikes from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Spikes seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            probability: Self::DEFAULT_PROBABILITY,
            max_boost: Self::DEFAULT_MAX_BOOST,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability.clamp(0.0, 1.0);
        self
    }
}

impl Perturbation for RandomSpikes {
    fn perturb(&mut self, observation: &Observation) -> Option<Observation> {
        if !self.rng.gen_bool(self.probability) {
            return None;
        }
        let mut boost = || self.rng.gen::<f64>() * self.max_boost;
        let tex = observation.tex_susp + boost();
        let col = observation.color_susp + boost();
        let rep = observation.frame_repeat_ratio + boost();
        Some(Observation::new(
            tex,
            col,
            rep,
            observation.av_mismatch,
            observation.has_audio,
        ))
    }

    fn name(&self) -> &str {
        "random_spikes"
    }

    fn reseed(&mut self, seed: Option<u64>) {
        self.rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Observation {
        Observation::new(0.2, 0.1, 0.3, 0.4, true)
    }

    #[test]
    fn no_perturbation_never_fires() {
        let mut p = NoPerturbation;
        for _ in 0..100 {
            assert!(p.perturb(&sample()).is_none());
        }
    }

    #[test]
    fn same_seed_same_spikes() {
        let mut a = RandomSpikes::seeded(42).with_probability(0.5);
        let mut b = RandomSpikes::seeded(42).with_probability(0.5);
        for _ in 0..50 {
            assert_eq!(a.perturb(&sample()), b.perturb(&sample()));
        }
    }

    #[test]
    fn spikes_only_raise_visual_scores() {
        let mut p = RandomSpikes::seeded(7).with_probability(1.0);
        let base = sample();
        for _ in 0..50 {
            let spiked = p.perturb(&base).unwrap();
            assert!(spiked.tex_susp >= base.tex_susp);
            assert!(spiked.color_susp >= base.color_susp);
            assert!(spiked.frame_repeat_ratio >= base.frame_repeat_ratio);
            assert!(spiked.tex_susp < base.tex_susp + 0.5);
            assert_eq!(spiked.av_mismatch, base.av_mismatch);
        }
    }

    #[test]
    fn reseed_restarts_the_sequence_and_keeps_probability() {
        let mut reseeded = RandomSpikes::seeded(1).with_probability(0.5);
        for _ in 0..7 {
            reseeded.perturb(&sample());
        }
        reseeded.reseed(Some(99));
        let mut fresh = RandomSpikes::seeded(99).with_probability(0.5);
        for _ in 0..50 {
            assert_eq!(reseeded.perturb(&sample()), fresh.perturb(&sample()));
        }
    }

    #[test]
    fn zero_probability_is_silent() {
        let mut p = RandomSpikes::seeded(1).with_probability(0.0);
        for _ in 0..100 {
            assert!(p.perturb(&sample()).is_none());
        }
    }
}

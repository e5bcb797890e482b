//! Clock and throttling utilities for stream sampling.
//!
//! Hosts drive the scheduler with a millisecond timestamp on every render
//! tick. This module provides:
//! - A monotonic session clock for hosts that run against real time
//! - The sampling throttle that decides which ticks actually sample

use std::time::Instant;

/// A session clock that provides monotonic milliseconds relative to
/// a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Milliseconds elapsed since session start.
    pub fn elapsed_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Sampling throttle for one tracked stream.
///
/// The host calls [`SampleThrottle::should_sample`] on every render tick;
/// only ticks at least `interval_ms` after the previous sample fire.
/// Skipped ticks are dropped, never queued.
#[derive(Debug, Default, Clone)]
pub struct SampleThrottle {
    last_sample_ms: Option<f64>,
}

impl SampleThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if enough time has passed for the next sample.
    /// Returns true and records `now_ms` if so.
    /// The first call always returns true.
    pub fn should_sample(&mut self, now_ms: f64, interval_ms: f64) -> bool {
        match self.last_sample_ms {
            None => {
                self.last_sample_ms = Some(now_ms);
                true
            }
            Some(last) if now_ms - last >= interval_ms => {
                self.last_sample_ms = Some(now_ms);
                true
            }
            _ => false,
        }
    }

    /// Timestamp of the last tick that sampled.
    pub fn last_sample_ms(&self) -> Option<f64> {
        self.last_sample_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_ms() < 1000.0);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_first_tick_always_samples() {
        let mut throttle = SampleThrottle::new();
        assert!(throttle.should_sample(12_345.0, 200.0));
        assert_eq!(throttle.last_sample_ms(), Some(12_345.0));
    }

    #[test]
    fn test_throttle_skips_until_interval() {
        let mut throttle = SampleThrottle::new();
        assert!(throttle.should_sample(0.0, 200.0));
        assert!(!throttle.should_sample(16.0, 200.0));
        assert!(!throttle.should_sample(199.0, 200.0));
        assert!(throttle.should_sample(200.0, 200.0)); // meets, not exceeds
        assert!(!throttle.should_sample(216.0, 200.0));
    }

    #[test]
    fn test_render_cadence_does_not_raise_sample_rate() {
        let mut throttle = SampleThrottle::new();
        let mut sampled = Vec::new();
        for tick in 0..200u32 {
            let now = tick as f64 * 16.0;
            if throttle.should_sample(now, 200.0) {
                sampled.push(now);
            }
        }
        for pair in sampled.windows(2) {
            assert!(pair[1] - pair[0] >= 200.0);
        }
        assert!(sampled.len() >= 15);
    }
}

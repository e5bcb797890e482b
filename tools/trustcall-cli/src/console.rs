//! Badge-style console output for scored observations.

use trustcall_capture_engine::sink::ObservationSink;
use trustcall_common::error::TrustcallResult;
use trustcall_signal_model::observation::{RiskLevel, ScoredObservation};
use trustcall_signal_model::stream::StreamId;

/// Prints one line per observation and keeps running totals.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    quiet: bool,
    summary: Summary,
}

/// Totals over everything a [`ConsoleSink`] received.
#[derive(Debug, Default, Clone)]
pub struct Summary {
    pub samples: u64,
    pub score_sum: f64,
    pub peak_score: f64,
    pub medium: u64,
    pub high: u64,
    pub perturbed: u64,
    pub last: Option<ScoredObservation>,
}

impl Summary {
    pub fn mean_score(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.score_sum / self.samples as f64
        }
    }
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            summary: Summary::default(),
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn print_summary(&self) {
        let s = &self.summary;
        println!();
        println!("Summary:");
        println!("  Samples: {}", s.samples);
        println!("  Mean score: {:.1}", s.mean_score());
        println!("  Peak score: {:.1}", s.peak_score);
        println!("  Amber samples: {}", s.medium);
        println!("  Red samples: {}", s.high);
        if s.perturbed > 0 {
            println!("  Demo spikes: {}", s.perturbed);
        }
        if let Some(last) = &s.last {
            println!(
                "  Final: {:.0}% {} (repeat ratio {:.2})",
                last.score,
                last.risk.label(),
                last.observation.frame_repeat_ratio
            );
        }
    }
}

/// Render one observation the way the overlay badge reads.
pub fn badge_line(observation: &ScoredObservation) -> String {
    let o = &observation.observation;
    let av = if o.has_audio {
        format!("{:.2}", o.av_mismatch)
    } else {
        "--".to_string()
    };
    format!(
        "[{}] #{:04} t={:>7.0}ms  Likely synthetic: {:>3.0}%  {:<5} tex={:.2} col={:.2} rep={:.2} av={}{}",
        observation.stream_id,
        observation.sequence,
        observation.timestamp_ms,
        observation.score,
        observation.risk.label(),
        o.tex_susp,
        o.color_susp,
        o.frame_repeat_ratio,
        av,
        if observation.perturbed { "  *" } else { "" }
    )
}

impl ObservationSink for ConsoleSink {
    fn emit(&mut self, observation: &ScoredObservation) -> TrustcallResult<()> {
        if !self.quiet {
            println!("{}", badge_line(observation));
        }

        let s = &mut self.summary;
        s.samples += 1;
        s.score_sum += observation.score;
        s.peak_score = s.peak_score.max(observation.score);
        match observation.risk {
            RiskLevel::High => s.high += 1,
            RiskLevel::Medium => s.medium += 1,
            RiskLevel::Low => {}
        }
        if observation.perturbed {
            s.perturbed += 1;
        }
        s.last = Some(observation.clone());
        Ok(())
    }

    fn set_visible(&mut self, stream: &StreamId, visible: bool) {
        if !self.quiet {
            println!("[{stream}] badge {}", if visible { "shown" } else { "hidden" });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustcall_signal_model::observation::Observation;
    use trustcall_signal_model::weights::ScoringWeights;

    fn scored(score: f64, risk: RiskLevel) -> ScoredObservation {
        ScoredObservation {
            stream_id: StreamId::new("clip"),
            sequence: 7,
            timestamp_ms: 1400.0,
            observation: Observation::new(1.0, 0.1, 0.5, 0.0, false),
            score,
            weights: ScoringWeights::for_stream(false),
            risk,
            perturbed: false,
        }
    }

    #[test]
    fn badge_line_shows_score_and_band() {
        let line = badge_line(&scored(61.4, RiskLevel::High));
        assert!(line.starts_with("[clip] #0007"));
        assert!(line.contains("Likely synthetic:  61%"));
        assert!(line.contains("RED"));
        assert!(line.contains("av=--"));
    }

    #[test]
    fn summary_tracks_bands_and_peak() {
        let mut sink = ConsoleSink::new(true);
        sink.emit(&scored(20.0, RiskLevel::Low)).unwrap();
        sink.emit(&scored(40.0, RiskLevel::Medium)).unwrap();
        sink.emit(&scored(75.0, RiskLevel::High)).unwrap();
        let summary = sink.summary();
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.peak_score, 75.0);
        assert!((summary.mean_score() - 45.0).abs() < 1e-9);
    }
}

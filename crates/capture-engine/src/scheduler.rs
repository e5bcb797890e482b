//! Per-stream sampling scheduler.
//!
//! The host calls [`Scheduler::tick`] once per presented frame (typically
//! 60 Hz). Each tracked stream samples only when its throttle allows,
//! so feature extraction runs at the configured rate no matter how fast
//! the host renders.
//!
//! Configuration arrives as immutable snapshots over a channel and is only
//! swapped in at the start of a tick, never mid-extraction.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use trustcall_common::clock::SampleThrottle;
use trustcall_common::config::AnalyzerConfig;
use trustcall_common::error::{TrustcallError, TrustcallResult};
use trustcall_processing_core::extractor::{AnalyzerState, FeatureExtractor};
use trustcall_processing_core::fusion::ScoreFusion;
use trustcall_processing_core::perturb::RandomSpikes;
use trustcall_signal_model::observation::{RiskLevel, ScoredObservation};
use trustcall_signal_model::stream::StreamId;

use crate::sampler::FrameSampler;
use crate::sink::ObservationSink;
use crate::source::{AudioSource, CaptureError, FrameSource};

/// Sources smaller than this on screen are not tracked.
pub const MIN_TRACKED_WIDTH: u32 = 120;
pub const MIN_TRACKED_HEIGHT: u32 = 90;

/// What one tick did for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A sample was taken and an observation emitted.
    Sampled,
    /// Too soon since the last sample.
    Throttled,
    /// The source had no decoded frame.
    NotReady,
    /// Pixel read-back was refused or failed; nothing emitted.
    Blocked,
    /// Analysis is disabled by configuration.
    Disabled,
}

/// Why `attach` did not start tracking a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AttachRejection {
    #[error("stream is already tracked")]
    AlreadyTracked,

    #[error("source is too small to track ({width}x{height})")]
    TooSmall { width: u32, height: u32 },
}

/// Per-stream counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub ticks: u64,
    pub samples: u64,
    pub throttled: u64,
    pub not_ready: u64,
    pub blocked: u64,
}

/// Sends configuration snapshots to a [`Scheduler`].
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    tx: Sender<AnalyzerConfig>,
}

impl ConfigHandle {
    /// Queue a new snapshot; it applies at the next tick boundary.
    pub fn update(&self, config: AnalyzerConfig) -> TrustcallResult<()> {
        self.tx
            .send(config)
            .map_err(|_| TrustcallError::config("scheduler is gone"))
    }
}

/// Everything owned by one tracked stream.
struct StreamEntry {
    source: Box<dyn FrameSource>,
    audio: Option<Box<dyn AudioSource>>,
    sampler: FrameSampler,
    state: AnalyzerState,
    throttle: SampleThrottle,
    sequence: u64,
    visible: bool,
    blocked_reported: bool,
    stats: StreamStats,
}

/// Drives sampling for every tracked stream.
pub struct Scheduler {
    entries: BTreeMap<StreamId, StreamEntry>,
    config: AnalyzerConfig,
    config_rx: Receiver<AnalyzerConfig>,
    extractor: FeatureExtractor,
    fusion: ScoreFusion,
}

impl Scheduler {
    /// Create a scheduler whose demo perturbation follows the config's
    /// `demo_seed` (entropy when unset).
    pub fn new(config: AnalyzerConfig) -> (Self, ConfigHandle) {
        let spikes = match config.demo_seed {
            Some(seed) => RandomSpikes::seeded(seed),
            None => RandomSpikes::from_entropy(),
        };
        Self::with_fusion(config, ScoreFusion::with_perturbation(Box::new(spikes)))
    }

    /// Create a scheduler with an explicit fusion stage.
    pub fn with_fusion(config: AnalyzerConfig, fusion: ScoreFusion) -> (Self, ConfigHandle) {
        let (tx, rx) = mpsc::channel();
        let scheduler = Self {
            entries: BTreeMap::new(),
            config: config.validated(),
            config_rx: rx,
            extractor: FeatureExtractor::new(),
            fusion,
        };
        (scheduler, ConfigHandle { tx })
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Start tracking a stream with a cold analysis state.
    ///
    /// Audio is probed once here; a missing or failed audio source leaves
    /// the stream audio-less for its whole lifetime.
    pub fn attach(
        &mut self,
        id: StreamId,
        source: Box<dyn FrameSource>,
        audio: Option<Box<dyn AudioSource>>,
    ) -> Result<(), AttachRejection> {
        if self.entries.contains_key(&id) {
            return Err(AttachRejection::AlreadyTracked);
        }
        let (width, height) = source.display_size();
        if width < MIN_TRACKED_WIDTH || height < MIN_TRACKED_HEIGHT {
            tracing::debug!(stream = %id, width, height, "Skipping small source");
            return Err(AttachRejection::TooSmall { width, height });
        }

        let audio = audio.filter(|a| a.available());
        let has_audio = audio.is_some();
        tracing::info!(
            stream = %id,
            source = source.name(),
            width,
            height,
            has_audio,
            "Stream attached"
        );

        self.entries.insert(
            id,
            StreamEntry {
                source,
                audio,
                sampler: FrameSampler::new(),
                state: AnalyzerState::new(has_audio),
                throttle: SampleThrottle::new(),
                sequence: 0,
                visible: true,
                blocked_reported: false,
                stats: StreamStats::default(),
            },
        );
        Ok(())
    }

    /// Stop tracking a stream. Its state is dropped without flushing.
    pub fn detach(&mut self, id: &StreamId) -> bool {
        match self.entries.remove(id) {
            Some(entry) => {
                tracing::info!(
                    stream = %id,
                    samples = entry.stats.samples,
                    frames = entry.state.total_frames(),
                    "Stream detached"
                );
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self, id: &StreamId) -> Option<StreamStats> {
        self.entries.get(id).map(|e| e.stats)
    }

    /// Analysis state of a tracked stream.
    pub fn state(&self, id: &StreamId) -> Option<&AnalyzerState> {
        self.entries.get(id).map(|e| &e.state)
    }

    /// Swap in the newest queued configuration snapshot, if any.
    fn drain_config(&mut self) {
        let mut latest = None;
        loop {
            match self.config_rx.try_recv() {
                Ok(config) => latest = Some(config),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if let Some(config) = latest {
            let config = config.validated();
            tracing::debug!(
                enabled = config.enabled,
                demo_mode = config.demo_mode,
                fps = config.fps,
                red_threshold = config.red_threshold,
                "Configuration updated"
            );
            if config.demo_seed != self.config.demo_seed {
                self.fusion.reseed(config.demo_seed);
            }
            self.config = config;
        }
    }

    /// Run one host tick at `now_ms` for every tracked stream.
    ///
    /// Streams are visited in id order; each stream's observations are
    /// emitted strictly in tick order.
    pub fn tick(
        &mut self,
        now_ms: f64,
        sink: &mut dyn ObservationSink,
    ) -> Vec<(StreamId, TickOutcome)> {
        self.drain_config();

        let config = &self.config;
        let interval_ms = config.sample_interval_ms();
        let mut outcomes = Vec::with_capacity(self.entries.len());

        for (id, entry) in self.entries.iter_mut() {
            entry.stats.ticks += 1;
            let outcome = tick_entry(
                id,
                entry,
                now_ms,
                interval_ms,
                config,
                &self.extractor,
                &mut self.fusion,
                sink,
            );
            outcomes.push((id.clone(), outcome));
        }
        outcomes
    }
}

#[allow(clippy::too_many_arguments)]
fn tick_entry(
    id: &StreamId,
    entry: &mut StreamEntry,
    now_ms: f64,
    interval_ms: f64,
    config: &AnalyzerConfig,
    extractor: &FeatureExtractor,
    fusion: &mut ScoreFusion,
    sink: &mut dyn ObservationSink,
) -> TickOutcome {
    if !config.enabled {
        if entry.visible {
            sink.set_visible(id, false);
            entry.visible = false;
        }
        return TickOutcome::Disabled;
    }
    if !entry.visible {
        sink.set_visible(id, true);
        entry.visible = true;
    }

    if !entry.throttle.should_sample(now_ms, interval_ms) {
        entry.stats.throttled += 1;
        return TickOutcome::Throttled;
    }

    entry.source.advance_to(now_ms);
    let raster = match entry.sampler.sample(entry.source.as_mut()) {
        Ok(Some(raster)) => raster,
        Ok(None) => {
            entry.stats.not_ready += 1;
            return TickOutcome::NotReady;
        }
        Err(err) => {
            entry.stats.blocked += 1;
            if !entry.blocked_reported {
                match &err {
                    CaptureError::Blocked(_) => {
                        tracing::warn!(stream = %id, error = %err, "Pixel read-back blocked")
                    }
                    _ => tracing::warn!(stream = %id, error = %err, "Frame sampling failed"),
                }
                entry.blocked_reported = true;
            }
            return TickOutcome::Blocked;
        }
    };

    let audio_rms = match entry.audio.as_mut() {
        Some(audio) => {
            audio.advance_to(now_ms);
            Some(audio.read_rms_window())
        }
        None => None,
    };

    let observation = extractor.extract(raster, audio_rms, &mut entry.state);
    let fused = fusion.fuse(observation, config.demo_mode);
    let scored = ScoredObservation {
        stream_id: id.clone(),
        sequence: entry.sequence,
        timestamp_ms: now_ms,
        observation: fused.observation,
        score: fused.score,
        weights: fused.weights,
        risk: RiskLevel::from_score(fused.score, config.red_threshold),
        perturbed: fused.perturbed,
    };
    entry.sequence += 1;
    entry.stats.samples += 1;

    tracing::debug!(
        stream = %id,
        sequence = scored.sequence,
        score = scored.score,
        risk = scored.risk.label(),
        "Sampled stream"
    );

    if let Err(e) = sink.emit(&scored) {
        tracing::warn!(stream = %id, error = %e, "Observation sink failed");
    }
    TickOutcome::Sampled
}

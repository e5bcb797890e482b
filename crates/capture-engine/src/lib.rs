//! TrustCall Capture Engine
//!
//! Drives per-stream sampling for the suspicion scorer. The host calls
//! [`Scheduler::tick`] once per render frame; each tracked stream is
//! throttled to the configured sampling rate, downscaled into a 128x128
//! raster, analysed, fused, and handed to an [`ObservationSink`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    Scheduler                      │
//! │  ┌─────────────┐  ┌─────────────┐                 │
//! │  │ FrameSource │  │ AudioSource │  (per stream)   │
//! │  └──────┬──────┘  └──────┬──────┘                 │
//! │         ▼                ▼                        │
//! │  FrameSampler ─► FeatureExtractor ─► ScoreFusion  │
//! │                                          │        │
//! │                                          ▼        │
//! │                                  ObservationSink  │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod sampler;
pub mod scheduler;
pub mod sink;
pub mod snapshot;
pub mod source;
pub mod sources;

pub use sampler::FrameSampler;
pub use scheduler::{AttachRejection, ConfigHandle, Scheduler, StreamStats, TickOutcome};
pub use sink::{JsonlObservationWriter, MemorySink, ObservationSink, TeeSink};
pub use snapshot::{capture_snapshot, save_snapshot};
pub use source::{AudioSource, CaptureError, FrameSource, FullFrame};

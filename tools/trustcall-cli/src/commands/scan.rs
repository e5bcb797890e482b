//! Replay a recorded frame sequence as if it were a live stream.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use trustcall_capture_engine::scheduler::Scheduler;
use trustcall_capture_engine::sink::{JsonlObservationWriter, ObservationSink, TeeSink};
use trustcall_capture_engine::source::{AudioSource, FrameSource};
use trustcall_capture_engine::sources::{FrameSequence, ImageSequenceSource, WavAudioSource};
use trustcall_common::clock::SessionClock;
use trustcall_common::config::AnalyzerConfig;
use trustcall_signal_model::raster::{SAMPLE_HEIGHT, SAMPLE_WIDTH};
use trustcall_signal_model::stream::{StreamHeader, StreamId};

use crate::console::ConsoleSink;

/// Options for `trustcall scan`.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub audio: Option<PathBuf>,
    pub fps: Option<f64>,
    pub source_fps: f64,
    pub render_hz: f64,
    pub realtime: bool,
    pub demo: bool,
    pub seed: Option<u64>,
    pub red_threshold: Option<f64>,
    pub out: Option<PathBuf>,
}

/// How a replay is paced.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub render_hz: f64,
    pub realtime: bool,
}

pub async fn run(
    frames_dir: PathBuf,
    options: ScanOptions,
    base: AnalyzerConfig,
) -> anyhow::Result<()> {
    let frames = FrameSequence::from_dir(&frames_dir)
        .map_err(|e| anyhow::anyhow!("Failed to list frames: {e}"))?;
    let frame_count = frames.len();

    let stream_id = stream_id_for(&frames_dir);
    let source = ImageSequenceSource::new(stream_id.as_str(), frames, options.source_fps)
        .map_err(|e| anyhow::anyhow!("Failed to open frame sequence: {e}"))?;
    let duration_ms = source.duration_ms();

    let audio: Option<Box<dyn AudioSource>> = match &options.audio {
        Some(path) => {
            let wav = WavAudioSource::open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open audio: {e}"))?;
            Some(Box::new(wav))
        }
        None => None,
    };

    let mut config = base;
    if let Some(fps) = options.fps {
        config.fps = fps;
    }
    if let Some(threshold) = options.red_threshold {
        config.red_threshold = threshold;
    }
    if options.demo {
        config.demo_mode = true;
    }
    if options.seed.is_some() {
        config.demo_seed = options.seed;
    }
    let config = config.validated();

    println!("Scanning stream: {stream_id}");
    println!("  Frames: {} @ {}fps", frame_count, options.source_fps);
    println!(
        "  Audio: {}",
        options
            .audio
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "  Sampling: {}fps (interval {:.0}ms)",
        config.fps,
        config.sample_interval_ms()
    );
    if config.demo_mode {
        println!("  Demo perturbation: on");
    }
    println!();

    drive(
        stream_id,
        Box::new(source),
        audio,
        config,
        Pacing {
            render_hz: options.render_hz,
            realtime: options.realtime,
        },
        options.out.as_deref(),
        duration_ms,
    )
    .await
}

/// Attach one replay source and tick the scheduler until it has played out.
pub async fn drive(
    stream_id: StreamId,
    source: Box<dyn FrameSource>,
    audio: Option<Box<dyn AudioSource>>,
    config: AnalyzerConfig,
    pacing: Pacing,
    out: Option<&Path>,
    duration_ms: f64,
) -> anyhow::Result<()> {
    let clock = SessionClock::start();
    let mut console = ConsoleSink::new(false);
    let mut writer = match out {
        Some(path) => {
            let header = StreamHeader {
                schema_version: StreamHeader::SCHEMA_VERSION.to_string(),
                stream_id: stream_id.clone(),
                raster_width: SAMPLE_WIDTH,
                raster_height: SAMPLE_HEIGHT,
                fps: config.fps,
                attached_wall: clock.epoch_wall().to_string(),
            };
            Some(
                JsonlObservationWriter::new(path, &header)
                    .map_err(|e| anyhow::anyhow!("Failed to create observation log: {e}"))?,
            )
        }
        None => None,
    };

    let (mut scheduler, _config_handle) = Scheduler::new(config);
    scheduler
        .attach(stream_id.clone(), source, audio)
        .map_err(|e| anyhow::anyhow!("Cannot track {stream_id}: {e}"))?;

    let render_hz = if pacing.render_hz.is_finite() && pacing.render_hz > 0.0 {
        pacing.render_hz
    } else {
        60.0
    };
    let tick_ms = 1000.0 / render_hz;

    if pacing.realtime {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(tick_ms / 1000.0));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut ctrl_c => {
                    println!();
                    println!("Interrupted");
                    break;
                }
            }
            let now_ms = clock.elapsed_ms();
            if now_ms > duration_ms {
                break;
            }
            tick_once(&mut scheduler, now_ms, &mut console, writer.as_mut());
        }
    } else {
        let mut tick: u64 = 0;
        loop {
            let now_ms = tick as f64 * tick_ms;
            if now_ms > duration_ms {
                break;
            }
            tick_once(&mut scheduler, now_ms, &mut console, writer.as_mut());
            tick += 1;
        }
    }

    if let Some(stats) = scheduler.stats(&stream_id) {
        tracing::debug!(
            stream = %stream_id,
            ticks = stats.ticks,
            samples = stats.samples,
            throttled = stats.throttled,
            not_ready = stats.not_ready,
            blocked = stats.blocked,
            "Replay finished"
        );
    }

    console.print_summary();
    if let Some(mut writer) = writer {
        writer
            .flush()
            .map_err(|e| anyhow::anyhow!("Failed to flush observation log: {e}"))?;
        println!(
            "  Log: {} ({} observations)",
            writer.path().display(),
            writer.lines_written()
        );
    }

    Ok(())
}

fn tick_once(
    scheduler: &mut Scheduler,
    now_ms: f64,
    console: &mut ConsoleSink,
    writer: Option<&mut JsonlObservationWriter>,
) {
    match writer {
        Some(writer) => {
            let mut tee = TeeSink::new().with(console).with(writer);
            scheduler.tick(now_ms, &mut tee);
        }
        None => {
            scheduler.tick(now_ms, console as &mut dyn ObservationSink);
        }
    }
}

fn stream_id_for(path: &Path) -> StreamId {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(StreamId::from)
        .unwrap_or_else(|| StreamId::new("stream"))
}

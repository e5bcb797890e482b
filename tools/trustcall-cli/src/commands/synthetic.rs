//! Generate synthetic test streams and score them.

use std::path::PathBuf;

use clap::ValueEnum;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trustcall_capture_engine::sources::{FrameSequence, ImageSequenceSource};
use trustcall_common::config::AnalyzerConfig;
use trustcall_signal_model::stream::StreamId;

use super::scan::{drive, Pacing};

/// Generated frame size.
const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

/// Frame rate of generated sequences.
const SOURCE_FPS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    /// Uniform gray: no texture, no skin, every frame a repeat
    Flat,
    /// Fresh random noise every frame
    Noise,
    /// One noise frame held forever
    StaticNoise,
    /// Skin-toned face with a mouth that opens and closes
    Skin,
}

impl Pattern {
    fn name(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Noise => "noise",
            Self::StaticNoise => "static-noise",
            Self::Skin => "skin",
        }
    }
}

pub async fn run(
    pattern: Pattern,
    frame_count: usize,
    seed: u64,
    write: Option<PathBuf>,
    out: Option<PathBuf>,
    config: AnalyzerConfig,
) -> anyhow::Result<()> {
    let frames = generate(pattern, frame_count.max(1), seed);

    if let Some(dir) = write {
        std::fs::create_dir_all(&dir)?;
        for (i, frame) in frames.iter().enumerate() {
            let path = dir.join(format!("frame_{i:05}.png"));
            frame
                .save(&path)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
        }
        println!("Wrote {} {} frames to {}", frames.len(), pattern.name(), dir.display());
        return Ok(());
    }

    println!("Scoring synthetic stream: {}", pattern.name());
    println!("  Frames: {} @ {}fps", frames.len(), SOURCE_FPS);
    println!();

    let source = ImageSequenceSource::new(pattern.name(), FrameSequence::Images(frames), SOURCE_FPS)
        .map_err(|e| anyhow::anyhow!("Failed to build synthetic source: {e}"))?;
    let duration_ms = source.duration_ms();

    drive(
        StreamId::new(pattern.name()),
        Box::new(source),
        None,
        config.validated(),
        Pacing {
            render_hz: 60.0,
            realtime: false,
        },
        out.as_deref(),
        duration_ms,
    )
    .await
}

/// Generate `count` frames of a pattern.
pub fn generate(pattern: Pattern, count: usize, seed: u64) -> Vec<RgbaImage> {
    let mut rng = StdRng::seed_from_u64(seed);
    match pattern {
        Pattern::Flat => {
            let frame = RgbaImage::from_pixel(WIDTH, HEIGHT, Rgba([128, 128, 128, 255]));
            vec![frame; count]
        }
        Pattern::Noise => (0..count).map(|_| noise_frame(&mut rng)).collect(),
        Pattern::StaticNoise => {
            let frame = noise_frame(&mut rng);
            vec![frame; count]
        }
        Pattern::Skin => (0..count).map(|i| face_frame(i, &mut rng)).collect(),
    }
}

fn noise_frame(rng: &mut StdRng) -> RgbaImage {
    RgbaImage::from_fn(WIDTH, HEIGHT, |_, _| {
        let v: u8 = rng.gen();
        Rgba([v, v, v, 255])
    })
}

/// A crude talking head: skin ellipse, eyes, and a mouth whose opening
/// follows a slow cycle. Light sensor noise keeps frames from repeating.
fn face_frame(index: usize, rng: &mut StdRng) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(WIDTH, HEIGHT, Rgba([40, 60, 90, 255]));
    let cx = (WIDTH / 2) as i32;
    let cy = (HEIGHT / 2) as i32;

    draw_filled_ellipse_mut(&mut img, (cx, cy), 70, 100, Rgba([205, 150, 120, 255]));
    draw_filled_circle_mut(&mut img, (cx - 28, cy - 30), 8, Rgba([60, 40, 30, 255]));
    draw_filled_circle_mut(&mut img, (cx + 28, cy - 30), 8, Rgba([60, 40, 30, 255]));

    let opening = match index % 12 {
        0..=3 => 2,
        4..=7 => 14,
        _ => 7,
    };
    draw_filled_rect_mut(
        &mut img,
        Rect::at(cx - 22, cy + 30).of_size(44, opening),
        Rgba([110, 40, 40, 255]),
    );

    for pixel in img.pixels_mut() {
        for c in 0..3 {
            let jitter: i16 = rng.gen_range(-6..=6);
            pixel[c] = (pixel[c] as i16 + jitter).clamp(0, 255) as u8;
        }
    }
    img
}

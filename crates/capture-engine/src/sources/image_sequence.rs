//! Image-sequence frame source.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbaImage;
use trustcall_signal_model::raster::Raster;

use crate::source::{CaptureError, FrameSource, FullFrame};

/// File extensions accepted when listing a frame directory.
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Where replayed frames come from.
#[derive(Debug, Clone)]
pub enum FrameSequence {
    /// Decoded lazily from disk, in order.
    Files(Vec<PathBuf>),
    /// Already in memory.
    Images(Vec<RgbaImage>),
}

impl FrameSequence {
    /// List image files in a directory, sorted by file name.
    pub fn from_dir(dir: &Path) -> Result<Self, CaptureError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(CaptureError::Decode(format!(
                "no frames found in {}",
                dir.display()
            )));
        }
        Ok(Self::Files(files))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Files(files) => files.len(),
            Self::Images(images) => images.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self, index: usize) -> Result<RgbaImage, CaptureError> {
        match self {
            Self::Files(files) => {
                let path = &files[index];
                image::open(path)
                    .map(|img| img.to_rgba8())
                    .map_err(|e| CaptureError::Decode(format!("{}: {e}", path.display())))
            }
            Self::Images(images) => Ok(images[index].clone()),
        }
    }
}

/// Plays a frame sequence at a fixed source frame rate.
///
/// Playback starts at the first `advance_to` call. Past the end, the last
/// frame stays on screen, like a paused video element.
pub struct ImageSequenceSource {
    name: String,
    frames: FrameSequence,
    source_fps: f64,
    start_ms: Option<f64>,
    current_index: Option<usize>,
    current: Option<RgbaImage>,
    display_size: (u32, u32),
}

impl ImageSequenceSource {
    pub fn new(name: impl Into<String>, frames: FrameSequence, source_fps: f64) -> Result<Self, CaptureError> {
        if frames.is_empty() {
            return Err(CaptureError::Decode("frame sequence is empty".into()));
        }
        // The first frame fixes the display size used for tracking eligibility.
        let first = frames.load(0)?;
        let display_size = first.dimensions();
        Ok(Self {
            name: name.into(),
            frames,
            source_fps: if source_fps > 0.0 { source_fps } else { 30.0 },
            start_ms: None,
            current_index: None,
            current: None,
            display_size,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Playback duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.frames.len() as f64 * 1000.0 / self.source_fps
    }

    /// Whether the host clock has moved past the last frame.
    pub fn is_finished(&self, now_ms: f64) -> bool {
        match self.start_ms {
            Some(start) => now_ms - start >= self.duration_ms(),
            None => false,
        }
    }

    fn index_at(&self, now_ms: f64) -> usize {
        let start = self.start_ms.unwrap_or(now_ms);
        let elapsed = (now_ms - start).max(0.0);
        let index = (elapsed * self.source_fps / 1000.0).floor() as usize;
        index.min(self.frames.len() - 1)
    }
}

impl FrameSource for ImageSequenceSource {
    fn is_ready(&self) -> bool {
        self.current.is_some()
    }

    fn draw_into(&mut self, raster: &mut Raster) -> Result<(), CaptureError> {
        let current = self.current.as_ref().ok_or(CaptureError::NotReady)?;
        let scaled = if current.dimensions() == (raster.width(), raster.height()) {
            current.clone()
        } else {
            imageops::resize(current, raster.width(), raster.height(), FilterType::Triangle)
        };
        raster.as_bytes_mut().copy_from_slice(scaled.as_raw());
        Ok(())
    }

    fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn capture_full(&mut self) -> Result<FullFrame, CaptureError> {
        let current = self.current.as_ref().ok_or(CaptureError::NotReady)?;
        Ok(FullFrame {
            width: current.width(),
            height: current.height(),
            rgba: current.as_raw().clone(),
        })
    }

    fn advance_to(&mut self, now_ms: f64) {
        if self.start_ms.is_none() {
            self.start_ms = Some(now_ms);
        }
        let index = self.index_at(now_ms);
        if self.current_index == Some(index) {
            return;
        }
        match self.frames.load(index) {
            Ok(image) => {
                self.current = Some(image);
                self.current_index = Some(index);
            }
            Err(e) => {
                // Keep showing the previous frame.
                tracing::warn!(source = %self.name, index, error = %e, "Failed to decode frame");
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

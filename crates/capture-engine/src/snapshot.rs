//! Still-frame capture.
//!
//! Encodes the source's current frame at full resolution as PNG. What
//! consumes the image (a classifier, a report) is up to the caller.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::source::{CaptureError, FrameSource};

/// Encode the current frame as PNG bytes.
///
/// Sources that forbid pixel read-back return [`CaptureError::Blocked`].
pub fn capture_snapshot(source: &mut dyn FrameSource) -> Result<Vec<u8>, CaptureError> {
    if !source.is_ready() {
        return Err(CaptureError::NotReady);
    }
    let frame = source.capture_full()?;
    let image = RgbaImage::from_raw(frame.width, frame.height, frame.rgba).ok_or_else(|| {
        CaptureError::Encode(format!(
            "frame buffer does not match {}x{} RGBA",
            frame.width, frame.height
        ))
    })?;

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    tracing::debug!(
        source = source.name(),
        width = image.width(),
        height = image.height(),
        bytes = bytes.len(),
        "Captured snapshot"
    );
    Ok(bytes)
}

/// Capture a snapshot and write it to `path`.
pub fn save_snapshot(source: &mut dyn FrameSource, path: &Path) -> Result<usize, CaptureError> {
    let bytes = capture_snapshot(source)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, &bytes)?;
    Ok(bytes.len())
}

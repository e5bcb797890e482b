//! Capture a full-resolution still frame.

use std::path::PathBuf;

use trustcall_capture_engine::snapshot::save_snapshot;
use trustcall_capture_engine::source::FrameSource;
use trustcall_capture_engine::sources::{FrameSequence, ImageSequenceSource};
use trustcall_common::error::TrustcallError;

pub fn run(input: PathBuf, output: PathBuf, at_ms: f64, source_fps: f64) -> anyhow::Result<()> {
    let frames = if input.is_dir() {
        FrameSequence::from_dir(&input).map_err(|e| anyhow::anyhow!("Failed to list frames: {e}"))?
    } else if input.exists() {
        FrameSequence::Files(vec![input.clone()])
    } else {
        anyhow::bail!("Input not found: {}", input.display());
    };

    let mut source = ImageSequenceSource::new("snapshot", frames, source_fps)
        .map_err(|e| anyhow::anyhow!("Failed to open input: {e}"))?;
    source.advance_to(0.0);
    source.advance_to(at_ms.max(0.0));

    let (width, height) = source.display_size();
    let bytes = save_snapshot(&mut source, &output).map_err(|e| {
        let err = TrustcallError::from(e);
        if err.is_blocked() {
            anyhow::anyhow!("Source refuses pixel read-back: {err}")
        } else {
            anyhow::anyhow!("Snapshot failed: {err}")
        }
    })?;

    println!(
        "Snapshot saved to: {} ({}x{}, {} bytes)",
        output.display(),
        width,
        height,
        bytes
    );
    Ok(())
}

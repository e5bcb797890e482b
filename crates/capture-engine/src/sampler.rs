//! Fixed-resolution frame sampling.

use trustcall_signal_model::raster::Raster;

use crate::source::{CaptureError, FrameSource};

/// Draws source frames into a reusable 128x128 RGBA raster.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    raster: Raster,
}

impl FrameSampler {
    pub fn new() -> Self {
        Self {
            raster: Raster::sampling(),
        }
    }

    /// Sample the current frame.
    ///
    /// `Ok(None)` means the source has nothing decoded yet: a normal
    /// condition at stream start, after which the tick simply ends.
    pub fn sample(&mut self, source: &mut dyn FrameSource) -> Result<Option<&Raster>, CaptureError> {
        if !source.is_ready() {
            return Ok(None);
        }
        match source.draw_into(&mut self.raster) {
            Ok(()) => Ok(Some(&self.raster)),
            Err(CaptureError::NotReady) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

//! RGBA sampling rasters.
//!
//! Every tracked stream is downscaled into a small fixed-size raster before
//! any feature is computed, so per-tick cost does not depend on the source
//! resolution.

/// Width of the sampling raster.
pub const SAMPLE_WIDTH: u32 = 128;

/// Height of the sampling raster.
pub const SAMPLE_HEIGHT: u32 = 128;

/// Bytes per RGBA pixel.
pub const RGBA_CHANNELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    #[error("raster dimensions must be non-zero (got {width}x{height})")]
    ZeroSized { width: u32, height: u32 },

    #[error("pixel buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// An RGBA8 pixel buffer of fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Create a zeroed (transparent black) raster.
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Create the standard 128x128 sampling raster.
    pub fn sampling() -> Self {
        Self {
            width: SAMPLE_WIDTH,
            height: SAMPLE_HEIGHT,
            pixels: vec![0; SAMPLE_WIDTH as usize * SAMPLE_HEIGHT as usize * RGBA_CHANNELS],
        }
    }

    /// Create a raster where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroSized { width, height });
        }
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * RGBA_CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap an existing RGBA buffer, validating its length.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroSized { width, height });
        }
        let expected = width as usize * height as usize * RGBA_CHANNELS;
        if pixels.len() != expected {
            return Err(RasterError::LengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (not bytes).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access for sources drawing into the raster.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Iterate pixels in row-major order as `[r, g, b, a]` slices.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(RGBA_CHANNELS)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * RGBA_CHANNELS;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * RGBA_CHANNELS;
        self.pixels[i..i + RGBA_CHANNELS].copy_from_slice(&rgba);
    }
}

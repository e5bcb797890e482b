//! Luma projection and whole-frame motion energy.

use trustcall_signal_model::raster::Raster;

/// Motion energy below which a frame counts as a repeat.
pub const REPEAT_MOTION_THRESHOLD: f64 = 0.005;

/// Integer luma of one RGB pixel.
///
/// Rounds by adding 500 before the integer division so results match
/// other implementations bit for bit.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

/// Per-pixel luma values for one raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaFrame {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl LumaFrame {
    pub fn from_raster(raster: &Raster) -> Self {
        let values = raster.pixels().map(|px| luma(px[0], px[1], px[2])).collect();
        Self {
            width: raster.width(),
            height: raster.height(),
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.values[y * self.width as usize + x]
    }

    pub fn same_shape(&self, other: &LumaFrame) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Mean absolute luma difference, normalized to `[0, 1]`.
///
/// Returns `None` when the frames have different shapes.
pub fn motion_energy(current: &LumaFrame, previous: &LumaFrame) -> Option<f64> {
    if !current.same_shape(previous) || current.values.is_empty() {
        return None;
    }
    let diff_sum: u64 = current
        .values
        .iter()
        .zip(previous.values.iter())
        .map(|(&a, &b)| a.abs_diff(b) as u64)
        .sum();
    Some(diff_sum as f64 / (current.values.len() as f64 * 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_rounding_matches_reference_values() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76); // 76.745 -> (76245 + 500) / 1000
        assert_eq!(luma(0, 255, 0), 150); // 149.685 + 0.5
        assert_eq!(luma(0, 0, 255), 29); // 29.07 + 0.5
        assert_eq!(luma(1, 1, 1), 1);
        assert_eq!(luma(200, 150, 100), 159); // 159.35 + 0.5 -> 159
    }

    #[test]
    fn identical_frames_have_zero_motion() {
        let raster = Raster::filled(8, 8, [90, 120, 30, 255]).unwrap();
        let a = LumaFrame::from_raster(&raster);
        let b = a.clone();
        assert_eq!(motion_energy(&a, &b), Some(0.0));
    }

    #[test]
    fn inverted_frames_have_full_motion() {
        let black = LumaFrame::from_raster(&Raster::filled(4, 4, [0, 0, 0, 255]).unwrap());
        let white = LumaFrame::from_raster(&Raster::filled(4, 4, [255, 255, 255, 255]).unwrap());
        assert_eq!(motion_energy(&black, &white), Some(1.0));
    }

    #[test]
    fn shape_mismatch_has_no_motion_value() {
        let a = LumaFrame::from_raster(&Raster::new(4, 4).unwrap());
        let b = LumaFrame::from_raster(&Raster::new(4, 5).unwrap());
        assert_eq!(motion_energy(&a, &b), None);
    }
}

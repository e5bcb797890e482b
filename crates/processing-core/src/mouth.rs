//! Lower-face motion proxy.
//!
//! Without landmarks, a fixed box in the lower middle of the raster stands
//! in for the mouth of a centered speaker.

use crate::luma::LumaFrame;

/// Gain applied to the normalized ROI difference before clamping.
const ROI_MOTION_GAIN: f64 = 4.0;

/// Pixel bounds of the mouth proxy region, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiBox {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
}

impl RoiBox {
    /// `x in [0.35W, 0.65W)`, `y in [0.55H, 0.85H)`, truncated to pixels.
    pub fn mouth(width: u32, height: u32) -> Self {
        let w = width as f64;
        let h = height as f64;
        Self {
            x0: (w * 0.35) as usize,
            x1: (w * 0.65) as usize,
            y0: (h * 0.55) as usize,
            y1: (h * 0.85) as usize,
        }
    }

    pub fn width(&self) -> usize {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> usize {
        self.y1.saturating_sub(self.y0)
    }

    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }
}

/// Luma values inside the ROI of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiPatch {
    roi: RoiBox,
    values: Vec<u8>,
}

impl RoiPatch {
    pub fn extract(frame: &LumaFrame, roi: RoiBox) -> Self {
        let mut values = Vec::with_capacity(roi.pixel_count());
        for y in roi.y0..roi.y1 {
            for x in roi.x0..roi.x1 {
                values.push(frame.at(x, y));
            }
        }
        Self { roi, values }
    }
}

/// Scaled mean absolute difference between two ROI patches, in `[0, 1]`.
///
/// Without a previous patch (or with one from a different box) the current
/// patch is compared against itself, so the reading is `0.0`.
pub fn roi_motion(current: &RoiPatch, previous: Option<&RoiPatch>) -> f64 {
    let count = current.values.len();
    if count == 0 {
        return 0.0;
    }
    let previous = match previous {
        Some(prev) if prev.roi == current.roi => prev,
        _ => return 0.0,
    };
    let diff_sum: u64 = current
        .values
        .iter()
        .zip(previous.values.iter())
        .map(|(&a, &b)| a.abs_diff(b) as u64)
        .sum();
    ((diff_sum as f64 / (count as f64 * 255.0)) * ROI_MOTION_GAIN).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustcall_signal_model::raster::Raster;

    #[test]
    fn mouth_box_on_sampling_raster() {
        let roi = RoiBox::mouth(128, 128);
        assert_eq!(
            roi,
            RoiBox {
                x0: 44,
                x1: 83,
                y0: 70,
                y1: 108
            }
        );
        assert_eq!(roi.pixel_count(), 39 * 38);
    }

    #[test]
    fn first_reading_is_zero() {
        let frame = LumaFrame::from_raster(&Raster::filled(128, 128, [90, 90, 90, 255]).unwrap());
        let patch = RoiPatch::extract(&frame, RoiBox::mouth(128, 128));
        assert_eq!(roi_motion(&patch, None), 0.0);
    }

    #[test]
    fn motion_is_scaled_and_clamped() {
        let roi = RoiBox::mouth(128, 128);
        let dark = LumaFrame::from_raster(&Raster::filled(128, 128, [0, 0, 0, 255]).unwrap());
        let dim = LumaFrame::from_raster(&Raster::filled(128, 128, [51, 51, 51, 255]).unwrap());
        let bright =
            LumaFrame::from_raster(&Raster::filled(128, 128, [255, 255, 255, 255]).unwrap());

        let dark_patch = RoiPatch::extract(&dark, roi);
        // 51/255 = 0.2, times the gain of 4.
        let m = roi_motion(&RoiPatch::extract(&dim, roi), Some(&dark_patch));
        assert!((m - 0.8).abs() < 1e-12);
        assert_eq!(
            roi_motion(&RoiPatch::extract(&bright, roi), Some(&dark_patch)),
            1.0
        );
    }

    #[test]
    fn changes_outside_the_box_are_ignored() {
        let roi = RoiBox::mouth(128, 128);
        let base = Raster::filled(128, 128, [100, 100, 100, 255]).unwrap();
        let mut changed = base.clone();
        changed.set_pixel(0, 0, [255, 255, 255, 255]);
        changed.set_pixel(127, 127, [0, 0, 0, 255]);

        let a = RoiPatch::extract(&LumaFrame::from_raster(&base), roi);
        let b = RoiPatch::extract(&LumaFrame::from_raster(&changed), roi);
        assert_eq!(roi_motion(&b, Some(&a)), 0.0);
    }
}

//! Texture regularity from the variance of a discrete Laplacian.
//!
//! Natural camera footage sits in a middle band of Laplacian variance on a
//! 128x128 luma raster. Oversmoothed frames fall below it and
//! oversharpened or artifact-heavy frames rise above it.

use crate::luma::LumaFrame;

/// Variance below this reads as oversmoothed.
pub const SMOOTH_VARIANCE: f64 = 10.0;

/// Variance above this reads as oversharpened.
pub const SHARP_VARIANCE: f64 = 80.0;

/// Variance span over which oversharpening saturates to full suspicion.
const SHARP_SPAN: f64 = 40.0;

/// Population variance of the 4-neighbour Laplacian over interior pixels.
///
/// Frames without interior pixels (either side shorter than 3) yield `0.0`.
pub fn laplacian_variance(frame: &LumaFrame) -> f64 {
    let w = frame.width() as usize;
    let h = frame.height() as usize;
    if w < 3 || h < 3 {
        return 0.0;
    }

    // Responses are bounded by +/-1020, so integer sums stay exact.
    let mut sum: i64 = 0;
    let mut sum_sq: i64 = 0;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let v = frame.at(x, y - 1) as i64
                + frame.at(x - 1, y) as i64
                + frame.at(x + 1, y) as i64
                + frame.at(x, y + 1) as i64
                - 4 * frame.at(x, y) as i64;
            sum += v;
            sum_sq += v * v;
        }
    }

    let n = ((w - 2) * (h - 2)) as f64;
    let mean = sum as f64 / n;
    (sum_sq as f64 / n - mean * mean).max(0.0)
}

/// Map a Laplacian variance onto `[0, 1]` texture suspicion.
pub fn texture_suspicion(variance: f64) -> f64 {
    if variance < SMOOTH_VARIANCE {
        ((SMOOTH_VARIANCE - variance) / SMOOTH_VARIANCE).clamp(0.0, 1.0)
    } else if variance > SHARP_VARIANCE {
        ((variance - SHARP_VARIANCE) / SHARP_SPAN).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustcall_signal_model::raster::Raster;

    fn frame_from_fn(w: u32, h: u32, f: impl Fn(u32, u32) -> u8) -> LumaFrame {
        let mut raster = Raster::new(w, h).unwrap();
        for y in 0..h {
            for x in 0..w {
                let v = f(x, y);
                raster.set_pixel(x, y, [v, v, v, 255]);
            }
        }
        LumaFrame::from_raster(&raster)
    }

    #[test]
    fn flat_frame_has_zero_variance_and_full_suspicion() {
        let frame = frame_from_fn(128, 128, |_, _| 117);
        let var = laplacian_variance(&frame);
        assert_eq!(var, 0.0);
        assert_eq!(texture_suspicion(var), 1.0);
    }

    #[test]
    fn linear_gradient_has_zero_laplacian() {
        let frame = frame_from_fn(32, 32, |x, _| (x * 4) as u8);
        assert_eq!(laplacian_variance(&frame), 0.0);
    }

    #[test]
    fn checkerboard_is_oversharpened() {
        let frame = frame_from_fn(32, 32, |x, y| if (x + y) % 2 == 0 { 0 } else { 255 });
        let var = laplacian_variance(&frame);
        assert!(var > SHARP_VARIANCE);
        assert_eq!(texture_suspicion(var), 1.0);
    }

    #[test]
    fn suspicion_bands() {
        assert!((texture_suspicion(5.0) - 0.5).abs() < 1e-12);
        assert_eq!(texture_suspicion(10.0), 0.0);
        assert_eq!(texture_suspicion(45.0), 0.0);
        assert_eq!(texture_suspicion(80.0), 0.0);
        assert!((texture_suspicion(100.0) - 0.5).abs() < 1e-12);
        assert_eq!(texture_suspicion(500.0), 1.0);
    }

    #[test]
    fn tiny_frames_have_no_interior() {
        let frame = frame_from_fn(2, 10, |x, y| (x * 50 + y) as u8);
        assert_eq!(laplacian_variance(&frame), 0.0);
    }
}

//! Skin-tone red/green channel correlation.
//!
//! Across real skin the red and green channels move together closely.
//! Generated faces often break that coupling, or flatten it into an
//! almost perfectly constant relationship.

use trustcall_signal_model::raster::Raster;

/// Skin pixels required before the correlation is trusted.
pub const MIN_SKIN_PIXELS: u64 = 50;

/// Suspicion reported when there is not enough skin to judge.
pub const INSUFFICIENT_SKIN_SUSPICION: f64 = 0.1;

/// Suspicion reported for an unnaturally constant R/G relationship.
pub const CONSTANT_SKIN_SUSPICION: f64 = 0.2;

const LOW_CORRELATION: f64 = 0.75;
const LOW_CORRELATION_SPAN: f64 = 0.35;
const HIGH_CORRELATION: f64 = 0.995;
const CORRELATION_EPSILON: f64 = 1e-6;

/// Fixed RGB skin classifier.
#[inline]
pub fn is_skin(r: u8, g: u8, b: u8) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && max - min > 15 && r.abs_diff(g) > 15 && r > g && r > b
}

/// Running R/G moments over skin pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkinMoments {
    pub count: u64,
    sum_r: f64,
    sum_g: f64,
    sum_rg: f64,
    sum_r2: f64,
    sum_g2: f64,
}

impl SkinMoments {
    pub fn from_raster(raster: &Raster) -> Self {
        let mut moments = Self::default();
        for px in raster.pixels() {
            moments.add(px[0], px[1], px[2]);
        }
        moments
    }

    /// Accumulate one pixel if it classifies as skin.
    pub fn add(&mut self, r: u8, g: u8, b: u8) {
        if !is_skin(r, g, b) {
            return;
        }
        let (r, g) = (r as f64, g as f64);
        self.count += 1;
        self.sum_r += r;
        self.sum_g += g;
        self.sum_rg += r * g;
        self.sum_r2 += r * r;
        self.sum_g2 += g * g;
    }

    /// R/G correlation, or `None` with too few skin pixels.
    pub fn correlation(&self) -> Option<f64> {
        if self.count <= MIN_SKIN_PIXELS {
            return None;
        }
        let n = self.count as f64;
        let mean_r = self.sum_r / n;
        let mean_g = self.sum_g / n;
        let cov = self.sum_rg / n - mean_r * mean_g;
        let var_r = (self.sum_r2 / n - mean_r * mean_r).max(0.0);
        let var_g = (self.sum_g2 / n - mean_g * mean_g).max(0.0);
        Some(cov / ((var_r * var_g).sqrt() + CORRELATION_EPSILON))
    }
}

/// Map skin moments onto `[0, 1]` color suspicion.
pub fn color_suspicion(moments: &SkinMoments) -> f64 {
    match moments.correlation() {
        None => INSUFFICIENT_SKIN_SUSPICION,
        Some(corr) if corr < LOW_CORRELATION => {
            ((LOW_CORRELATION - corr) / LOW_CORRELATION_SPAN).clamp(0.0, 1.0)
        }
        Some(corr) if corr > HIGH_CORRELATION => CONSTANT_SKIN_SUSPICION,
        Some(_) => 0.0,
    }
}

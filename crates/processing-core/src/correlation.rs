//! Pearson correlation over paired histories.

/// Fewer pairs than this yields a correlation of `0.0`.
pub const MIN_PAIRS: usize = 6;

/// Denominator used when the variance product is not positive.
const DENOM_EPSILON: f64 = 1e-6;

/// Pearson correlation of the first `min(x.len(), y.len())` pairs.
///
/// Uses population moments. Returns `0.0` with fewer than [`MIN_PAIRS`]
/// pairs and never returns NaN: a zero (or rounding-negative) variance
/// product is replaced by a small epsilon, and the result is clamped to
/// `[-1, 1]`.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < MIN_PAIRS {
        return 0.0;
    }

    let (mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y.iter()).take(n) {
        sx += a;
        sy += b;
        sxx += a * a;
        syy += b * b;
        sxy += a * b;
    }

    let nf = n as f64;
    let mean_x = sx / nf;
    let mean_y = sy / nf;
    let cov = sxy / nf - mean_x * mean_y;
    let var_x = sxx / nf - mean_x * mean_x;
    let var_y = syy / nf - mean_y * mean_y;

    let product = var_x * var_y;
    let denom = if product > 0.0 {
        product.sqrt()
    } else {
        DENOM_EPSILON
    };

    let r = cov / denom;
    if r.is_nan() {
        0.0
    } else {
        r.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_series_is_zero() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(pearson(&x, &x), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn perfect_positive_and_negative() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 1.0).collect();
        let z: Vec<f64> = x.iter().map(|v| -0.5 * v).collect();
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-9);
        assert!((pearson(&x, &z) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_series_are_defined() {
        let a = [0.3; 12];
        let b = [0.7; 12];
        let r = pearson(&a, &b);
        assert!(r.is_finite());
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn uses_shorter_horizon() {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..20).map(|i| (i * 2) as f64).collect();
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn self_correlation_is_one(
            values in proptest::collection::vec(-1000.0f64..1000.0, 6..64),
        ) {
            let spread = values.iter().cloned().fold(f64::MIN, f64::max)
                - values.iter().cloned().fold(f64::MAX, f64::min);
            prop_assume!(spread > 1.0);
            prop_assert!((pearson(&values, &values) - 1.0).abs() < 1e-6);
        }

        #[test]
        fn result_is_bounded(
            x in proptest::collection::vec(-1.0f64..1.0, 0..40),
            y in proptest::collection::vec(-1.0f64..1.0, 0..40),
        ) {
            let r = pearson(&x, &y);
            prop_assert!(r.is_finite());
            prop_assert!((-1.0..=1.0).contains(&r));
            if x.len().min(y.len()) < MIN_PAIRS {
                prop_assert_eq!(r, 0.0);
            }
        }
    }
}

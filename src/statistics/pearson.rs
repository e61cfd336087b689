//! Pearson correlation and its two-tailed significance.

/// Collect the positions where both channels have a present, finite value.
///
/// Returns the paired values in row order. Slices of unequal length are
/// paired up to the shorter length.
pub fn valid_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (a, b) in x.iter().zip(y.iter()) {
        if let (Some(a), Some(b)) = (a, b) {
            if a.is_finite() && b.is_finite() {
                xs.push(*a);
                ys.push(*b);
            }
        }
    }
    (xs, ys)
}

/// Pearson correlation coefficient via the closed-form sums method.
///
/// Returns `None` when the inputs have mismatched lengths, fewer than two
/// pairs, or zero variance in either channel: degenerate input is an
/// undefined result, not a divide-by-zero. The coefficient is clamped to
/// `[-1, 1]` against floating-point drift.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;
    let mut sum_xy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        sum_x += xi;
        sum_y += yi;
        sum_x2 += xi * xi;
        sum_y2 += yi * yi;
        sum_xy += xi * yi;
    }

    let denom_x = n * sum_x2 - sum_x * sum_x;
    let denom_y = n * sum_y2 - sum_y * sum_y;
    let denom = (denom_x * denom_y).sqrt();
    if denom <= 0.0 || !denom.is_finite() {
        return None;
    }

    let r = (n * sum_xy - sum_x * sum_y) / denom;
    Some(r.clamp(-1.0, 1.0))
}

/// Two-tailed p-value for a Pearson coefficient, via the Fisher-z normal
/// approximation: `p = erfc(|atanh(r)| * sqrt(n - 3) / sqrt(2))`.
///
/// `|r| = 1` reports `p = 0`. For `n < 4` the scale factor `sqrt(n - 3)`
/// degenerates and the p-value is undefined (`None`).
pub fn two_tailed_p(r: f64, n: usize) -> Option<f64> {
    if r.abs() >= 1.0 {
        return Some(0.0);
    }
    if n < 4 {
        return None;
    }
    let z = r.atanh() * ((n as f64) - 3.0).sqrt();
    // The approximation can overshoot 1 by ~3e-8 at z = 0.
    Some(erfc(z.abs() / std::f64::consts::SQRT_2).min(1.0))
}

/// Complementary error function, rational Chebyshev approximation.
///
/// Absolute error below 1.2e-7 everywhere, which is far inside the noise
/// of the normal approximation it serves.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

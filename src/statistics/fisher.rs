//! Fisher z-transform and the z-flip contrast.

/// Fisher-transformed correlation, scaled by `sqrt(n - 3)`.
///
/// Saturates to signed infinity at `|r| = 1`, where `atanh` is undefined:
/// the transform must report "as strong as representable", never raise.
/// For `n < 3` the scale factor is itself undefined and the result is
/// NaN; in practice two-point samples produce `|r| = 1` and take the
/// saturation branch first.
pub fn fisher_z(r: f64, n: usize) -> f64 {
    if r >= 1.0 {
        return f64::INFINITY;
    }
    if r <= -1.0 {
        return f64::NEG_INFINITY;
    }
    r.atanh() * ((n as f64) - 3.0).sqrt()
}

/// The z-flip magnitude between two complementary segments:
/// `|z_a| + |z_b|`.
///
/// This is a derived diagnostic contrast, not a statistical test. The
/// absolute-sum convention is sign-stable under relabeling of the two
/// segments; the signed per-field difference is reported separately as
/// the phase-cancellation contrast.
pub fn z_flip(z_a: f64, z_b: f64) -> f64 {
    z_a.abs() + z_b.abs()
}

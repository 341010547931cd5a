//! Precision policies.
//!
//! Anything that must be bit-reproducible (hashing coordinates, keys) goes
//! through these helpers first.

/// Canonicalize a floating-point value for deterministic hashing.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Clamp into `[0, 1]`, mapping NaN to `0`.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, clamp_unit};

    #[test]
    fn negative_zero_is_canonicalized() {
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0f64.to_bits());
        assert!(canonical_f64(f64::NAN).is_nan());
        assert_eq!(canonical_f64(2.5), 2.5);
    }

    #[test]
    fn clamp_unit_handles_out_of_range_and_nan() {
        assert_eq!(clamp_unit(1.5), 1.0);
        assert_eq!(clamp_unit(-0.25), 0.0);
        assert_eq!(clamp_unit(0.3), 0.3);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }
}

//! Publish-time rounding of millimetre estimates.

/// Round a millimetre estimate to the nearest integer (ties away from zero)
/// and clamp to the `u32` range. Negative and non-finite values map to 0.
#[inline]
pub fn quantize_mm(x_mm: f64) -> u32 {
    if !x_mm.is_finite() || x_mm <= 0.0 {
        return 0;
    }
    let r = x_mm.round();
    if r >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        r as u32
    }
}

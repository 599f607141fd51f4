//! Scalar helpers shared by the vector, quaternion, and matrix types.

/// Default tolerance for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-5;

/// Tolerance used when checking that a vector or quaternion is unit length.
pub const UNIT_EPSILON: f32 = 1.0e-4;

/// Fast approximate reciprocal square root.
///
/// One bit-shift initial guess plus a single Newton-Raphson refinement.
/// Roughly four decimal digits of precision; callers that need exact
/// normalisation use `1.0 / x.sqrt()` instead.
#[inline]
pub fn inv_sqrt_fast(x: f32) -> f32 {
    let half = x * 0.5;
    let guess = f32::from_bits(0x5f37_59df - (x.to_bits() >> 1));
    guess * (1.5 - half * guess * guess)
}

/// `acos` with the argument clamped to its domain.
///
/// Dot products of nominally unit inputs drift slightly past ±1; clamping
/// keeps the result finite instead of NaN.
#[inline]
pub fn acos_clamped(x: f32) -> f32 {
    x.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inv_sqrt_fast_accuracy() {
        for x in [0.01f32, 0.5, 1.0, 2.0, 100.0, 12345.0] {
            let exact = 1.0 / x.sqrt();
            let approx = inv_sqrt_fast(x);
            let relative = ((approx - exact) / exact).abs();
            assert!(relative < 1.0e-3, "x={x} relative error {relative}");
        }
    }

    #[test]
    fn test_acos_clamped_out_of_domain() {
        assert_eq!(acos_clamped(1.0 + 1.0e-6), 0.0);
        assert!((acos_clamped(-1.0 - 1.0e-6) - std::f32::consts::PI).abs() < 1.0e-6);
    }
}

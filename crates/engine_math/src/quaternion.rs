//! Quaternion rotations.
//!
//! [`Quaternion`] reinterprets a [`Vec4`] as an (x, y, z, w) rotation. Unit
//! length is a convention rather than a structural invariant: repeated
//! composition drifts, and callers re-normalise at the points that matter.

use std::ops::{Mul, Neg};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::contract_assert;
use crate::scalar;
use crate::vec4::Vec4;

/// A rotation stored as four floats in (x, y, z, w) order.
///
/// Composition order is a hard contract: `a * b` applies `b`'s rotation
/// first, then `a`'s, so `(a * b).rotate_vector3(v)` equals
/// `a.rotate_vector3(b.rotate_vector3(v))`. Multi-bone code depends on this
/// exact ordering — a flipped product still yields a valid rotation, just
/// the wrong one.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quaternion(Vec4);

// SAFETY: transparent wrapper over a Pod type.
unsafe impl Zeroable for Quaternion {}
unsafe impl Pod for Quaternion {}

impl Quaternion {
    /// The identity rotation (0, 0, 0, 1).
    pub const IDENTITY: Self = Self(Vec4::UNIT_W);

    /// The zero quaternion — not a rotation. Returned by [`Quaternion::inverse`]
    /// in its documented degenerate case.
    pub const ZERO: Self = Self(Vec4::ZERO);

    /// Create a quaternion from explicit components.
    #[must_use]
    pub const fn from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self(Vec4::new(x, y, z, w))
    }

    /// Reinterpret a [`Vec4`] as a quaternion.
    #[must_use]
    pub const fn from_vec4(v: Vec4) -> Self {
        Self(v)
    }

    /// The components as a [`Vec4`].
    #[must_use]
    pub const fn to_vec4(self) -> Vec4 {
        self.0
    }

    /// X (i) component.
    #[must_use]
    pub const fn x(self) -> f32 {
        self.0.x
    }

    /// Y (j) component.
    #[must_use]
    pub const fn y(self) -> f32 {
        self.0.y
    }

    /// Z (k) component.
    #[must_use]
    pub const fn z(self) -> f32 {
        self.0.z
    }

    /// W (scalar) component.
    #[must_use]
    pub const fn w(self) -> f32 {
        self.0.w
    }

    /// Rotation of `radians` about a normalised axis (half-angle formula).
    ///
    /// The axis must be unit length — that is the caller's contract.
    #[must_use]
    pub fn from_axis_angle(axis: Vec4, radians: f32) -> Self {
        contract_assert!(axis.is_normalized3(), "from_axis_angle requires a unit axis");
        let half = 0.5 * radians;
        let sin_half = half.sin();
        Self::from_xyzw(
            axis.x * sin_half,
            axis.y * sin_half,
            axis.z * sin_half,
            half.cos(),
        )
    }

    /// Rotation from Euler angles in radians, composed exactly as
    /// `Rx * Ry * Rz` and re-normalised.
    ///
    /// The axis order is a hard external contract shared with
    /// [`Matrix4x4::from_euler`](crate::Matrix4x4::from_euler); do not
    /// reorder the factors.
    #[must_use]
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        let rx = Self::from_axis_angle(Vec4::UNIT_X, x);
        let ry = Self::from_axis_angle(Vec4::UNIT_Y, y);
        let rz = Self::from_axis_angle(Vec4::UNIT_Z, z);
        (rx * ry * rz).normalize()
    }

    /// The shortest-arc rotation taking the unit vector `from` onto the unit
    /// vector `to`.
    ///
    /// Parallel inputs yield the identity. Anti-parallel inputs have no
    /// unique shortest arc; a half-turn about an orthogonal axis derived
    /// deterministically from `from`'s components is used so the result is
    /// repeatable.
    #[must_use]
    pub fn from_rotation_between(from: Vec4, to: Vec4) -> Self {
        contract_assert!(from.is_normalized3(), "from_rotation_between requires unit vectors");
        contract_assert!(to.is_normalized3(), "from_rotation_between requires unit vectors");

        let dot = from.dot3(to);
        if dot >= 1.0 - scalar::EPSILON {
            return Self::IDENTITY;
        }
        if dot <= -1.0 + scalar::EPSILON {
            // Half-turn about any axis orthogonal to `from`; pick by the
            // dominant component so the choice is deterministic.
            let axis = if from.x.abs() > from.z.abs() {
                Vec4::new(-from.y, from.x, 0.0, 0.0).normalize3()
            } else {
                Vec4::new(0.0, -from.z, from.y, 0.0).normalize3()
            };
            return Self::from_xyzw(axis.x, axis.y, axis.z, 0.0);
        }
        let cross = from.cross3(to);
        Self::from_xyzw(cross.x, cross.y, cross.z, 1.0 + dot).normalize()
    }

    /// Extract the pure rotation from three rotation(+scale) matrix rows.
    ///
    /// Trace-based with a largest-diagonal fallback; the result is
    /// re-normalised before return. Zero-length rows violate the contract —
    /// there is no recovery path, optimised builds produce garbage.
    #[must_use]
    pub fn from_rotation_matrix_rows(r0: Vec4, r1: Vec4, r2: Vec4) -> Self {
        contract_assert!(!r0.is_near_zero3(scalar::EPSILON), "degenerate rotation row 0");
        contract_assert!(!r1.is_near_zero3(scalar::EPSILON), "degenerate rotation row 1");
        contract_assert!(!r2.is_near_zero3(scalar::EPSILON), "degenerate rotation row 2");

        // Divide any scale out of the rows; the trace formulas are only
        // exact on an orthonormal block.
        let m = [
            r0.normalize3().to_array(),
            r1.normalize3().to_array(),
            r2.normalize3().to_array(),
        ];
        let trace = m[0][0] + m[1][1] + m[2][2];

        let q = if trace > 0.0 {
            let s = 1.0 / (trace + 1.0).sqrt();
            let half_s = 0.5 * s;
            Self::from_xyzw(
                (m[1][2] - m[2][1]) * half_s,
                (m[2][0] - m[0][2]) * half_s,
                (m[0][1] - m[1][0]) * half_s,
                0.5 / s,
            )
        } else {
            // Largest diagonal element; ties resolve to the earliest axis.
            let mut i = 0;
            if m[1][1] > m[0][0] {
                i = 1;
            }
            if m[2][2] > m[i][i] {
                i = 2;
            }
            let j = (i + 1) % 3;
            let k = (j + 1) % 3;

            // Pseudo-trace keeps the divisor away from zero when the real
            // trace is non-positive.
            let s = (1.0 + m[i][i] - m[j][j] - m[k][k]).sqrt();
            let recip = 0.5 / s;
            let mut lanes = [0.0f32; 4];
            lanes[i] = 0.5 * s;
            lanes[j] = (m[i][j] + m[j][i]) * recip;
            lanes[k] = (m[i][k] + m[k][i]) * recip;
            lanes[3] = (m[j][k] - m[k][j]) * recip;
            Self::from_xyzw(lanes[0], lanes[1], lanes[2], lanes[3])
        };

        q.normalize()
    }

    /// Component-wise dot product.
    #[must_use]
    pub fn dot(self, rhs: Self) -> f32 {
        self.0.dot4(rhs.0)
    }

    /// Quaternion length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.0.length4()
    }

    /// Squared quaternion length.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.0.length4_squared()
    }

    /// True if unit length within [`scalar::UNIT_EPSILON`].
    #[must_use]
    pub fn is_normalized(self) -> bool {
        self.0.is_normalized4()
    }

    /// Exact normalisation via a full-precision reciprocal square root.
    #[must_use]
    pub fn normalize(self) -> Self {
        let length_squared = self.length_squared();
        contract_assert!(
            length_squared > scalar::EPSILON * scalar::EPSILON,
            "normalize of a near-zero quaternion"
        );
        Self(self.0 * (1.0 / length_squared.sqrt()))
    }

    /// Fast approximate normalisation.
    ///
    /// Uses [`scalar::inv_sqrt_fast`]; about four decimal digits of
    /// precision. For paths where speed matters more than bit-exactness —
    /// everything else should call [`Quaternion::normalize`].
    #[must_use]
    pub fn normalize_fast(self) -> Self {
        let length_squared = self.length_squared();
        contract_assert!(
            length_squared > scalar::EPSILON * scalar::EPSILON,
            "normalize_fast of a near-zero quaternion"
        );
        Self(self.0 * scalar::inv_sqrt_fast(length_squared))
    }

    /// The conjugate (-x, -y, -z, w). Equal to the inverse for unit
    /// quaternions.
    #[must_use]
    pub fn conjugate(self) -> Self {
        Self::from_xyzw(-self.x(), -self.y(), -self.z(), self.w())
    }

    /// The inverse: conjugate divided by squared length.
    ///
    /// A near-zero quaternion has no inverse; the documented degenerate
    /// result is [`Quaternion::ZERO`], not an error.
    #[must_use]
    pub fn inverse(self) -> Self {
        let length_squared = self.length_squared();
        if length_squared <= scalar::EPSILON * scalar::EPSILON {
            return Self::ZERO;
        }
        Self(self.conjugate().0 / length_squared)
    }

    /// Negate all four components if w is negative.
    ///
    /// `q` and `-q` encode the same rotation; interpolation needs both
    /// operands on the same hemisphere to take the short way around.
    #[must_use]
    pub fn to_shortest_path(self) -> Self {
        if self.w() < 0.0 { -self } else { self }
    }

    /// Rotate the (x, y, z) part of `v` by this quaternion (the sandwich
    /// product restricted to the vector part). The result's w lane is zero.
    ///
    /// Requires a unit quaternion.
    #[must_use]
    pub fn rotate_vector3(self, v: Vec4) -> Vec4 {
        contract_assert!(self.is_normalized(), "rotate_vector3 requires a unit quaternion");
        let axis = Vec4::new(self.x(), self.y(), self.z(), 0.0);
        let t = axis.cross3(v) * 2.0;
        let rotated = v + t * self.w() + axis.cross3(t);
        Vec4::new(rotated.x, rotated.y, rotated.z, 0.0)
    }

    /// Angular distance to `rhs` in radians: `acos(|dot|)`.
    ///
    /// Sign-insensitive, so `q` and `-q` are at distance zero.
    #[must_use]
    pub fn angular_distance(self, rhs: Self) -> f32 {
        scalar::acos_clamped(self.dot(rhs).abs())
    }

    /// Recover the (unit axis, angle) pair. The identity (and any rotation
    /// with a vanishing vector part) reports the X axis with angle zero.
    #[must_use]
    pub fn axis_angle(self) -> (Vec4, f32) {
        let sin_half_squared = 1.0 - self.w() * self.w();
        if sin_half_squared <= scalar::EPSILON * scalar::EPSILON {
            return (Vec4::UNIT_X, 0.0);
        }
        let inv_sin_half = 1.0 / sin_half_squared.sqrt();
        let axis = Vec4::new(
            self.x() * inv_sin_half,
            self.y() * inv_sin_half,
            self.z() * inv_sin_half,
            0.0,
        );
        (axis, 2.0 * scalar::acos_clamped(self.w()))
    }

    /// Normalised linear interpolation.
    ///
    /// Sign-corrected component blend followed by a re-normalise. Cheap, but
    /// the angular velocity is not constant across `t`; use
    /// [`Quaternion::slerp`] when that matters.
    #[must_use]
    pub fn nlerp(self, to: Self, t: f32) -> Self {
        let to = if self.dot(to) < 0.0 { -to } else { to };
        Self(self.0.lerp(to.0, t)).normalize()
    }

    /// Spherical linear interpolation along the shorter great-circle arc.
    ///
    /// Falls back to [`Quaternion::nlerp`] when the arc is too small for a
    /// stable `sin` division — the two are indistinguishable there anyway.
    #[must_use]
    pub fn slerp(self, to: Self, t: f32) -> Self {
        let mut dot = self.dot(to);
        let to = if dot < 0.0 {
            dot = -dot;
            -to
        } else {
            to
        };

        if dot >= 1.0 - scalar::EPSILON {
            return Self(self.0.lerp(to.0, t)).normalize();
        }

        let theta = scalar::acos_clamped(dot);
        let inv_sin_theta = 1.0 / theta.sin();
        let weight_from = ((1.0 - t) * theta).sin() * inv_sin_theta;
        let weight_to = (t * theta).sin() * inv_sin_theta;
        Self(self.0 * weight_from + to.0 * weight_to).normalize()
    }

    /// Spherical quadrangle interpolation across four control rotations.
    ///
    /// Two nested SLERPs blended with the reparameterisation `2t(1 - t)`,
    /// giving a smooth spline through keyframe neighbourhoods.
    #[must_use]
    pub fn squad(q0: Self, q1: Self, q2: Self, q3: Self, t: f32) -> Self {
        let outer = q0.slerp(q3, t);
        let inner = q1.slerp(q2, t);
        outer.slerp(inner, 2.0 * t * (1.0 - t))
    }

    /// Serialise as 16 bytes: four consecutive little-endian IEEE-754 floats
    /// in (x, y, z, w) order.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_bytes()
    }

    /// Inverse of [`Quaternion::to_bytes`].
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Vec4::from_bytes(bytes))
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product. `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Self) -> Self {
        let (ax, ay, az, aw) = (self.x(), self.y(), self.z(), self.w());
        let (bx, by, bz, bw) = (rhs.x(), rhs.y(), rhs.z(), rhs.w());
        Self::from_xyzw(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by + ay * bw + az * bx - ax * bz,
            aw * bz + az * bw + ax * by - ay * bx,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_EPSILON: f32 = 1.0e-5;

    fn assert_near(a: f32, b: f32, epsilon: f32) {
        assert!((a - b).abs() <= epsilon, "{a} vs {b}");
    }

    fn assert_same_rotation(a: Quaternion, b: Quaternion, epsilon: f32) {
        assert!(
            a.angular_distance(b) <= epsilon,
            "rotations differ by {} rad: {a:?} vs {b:?}",
            a.angular_distance(b)
        );
    }

    fn to_glam(q: Quaternion) -> glam::Quat {
        glam::Quat::from_xyzw(q.x(), q.y(), q.z(), q.w())
    }

    #[test]
    fn test_identity_rotates_nothing() {
        let v = Vec4::new(1.0, -2.0, 3.0, 0.0);
        assert!(Quaternion::IDENTITY.rotate_vector3(v).is_near_equal(v, TEST_EPSILON));
        assert_eq!(Quaternion::IDENTITY * Quaternion::IDENTITY, Quaternion::IDENTITY);
    }

    #[test]
    fn test_axis_angle_quarter_turn_about_z() {
        // axis (0,0,1), angle 90° -> (0, 0, sin 45°, cos 45°)
        let q = Quaternion::from_axis_angle(Vec4::UNIT_Z, std::f32::consts::FRAC_PI_2);
        let half_sqrt = std::f32::consts::FRAC_1_SQRT_2;
        assert_near(q.x(), 0.0, TEST_EPSILON);
        assert_near(q.y(), 0.0, TEST_EPSILON);
        assert_near(q.z(), half_sqrt, TEST_EPSILON);
        assert_near(q.w(), half_sqrt, TEST_EPSILON);

        let rotated = q.rotate_vector3(Vec4::UNIT_X);
        assert!(rotated.is_near_equal(Vec4::UNIT_Y, TEST_EPSILON), "{rotated:?}");
    }

    #[test]
    fn test_axis_angle_roundtrip() {
        let axis = Vec4::new(1.0, 1.0, 1.0, 0.0).normalize3();
        let q = Quaternion::from_axis_angle(axis, 2.0);
        let (recovered_axis, recovered_angle) = q.axis_angle();
        assert!(recovered_axis.is_near_equal(axis, 1.0e-4));
        assert_near(recovered_angle, 2.0, 1.0e-4);
    }

    #[test]
    fn test_axis_angle_of_identity() {
        let (axis, angle) = Quaternion::IDENTITY.axis_angle();
        assert_eq!(axis, Vec4::UNIT_X);
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_composition_applies_rhs_first() {
        let a = Quaternion::from_axis_angle(Vec4::UNIT_Z, 0.7);
        let b = Quaternion::from_axis_angle(Vec4::UNIT_X, -1.3);
        let v = Vec4::new(0.3, -2.0, 5.0, 0.0);

        let composed = (a * b).normalize().rotate_vector3(v);
        let sequential = a.rotate_vector3(b.rotate_vector3(v));
        assert!(composed.is_near_equal(sequential, 1.0e-4), "{composed:?} vs {sequential:?}");
    }

    #[test]
    fn test_product_matches_glam() {
        let a = Quaternion::from_euler(0.3, -1.1, 2.0);
        let b = Quaternion::from_euler(-0.8, 0.4, 0.9);
        let ours = a * b;
        let oracle = to_glam(a) * to_glam(b);
        assert_near(ours.x(), oracle.x, 1.0e-5);
        assert_near(ours.y(), oracle.y, 1.0e-5);
        assert_near(ours.z(), oracle.z, 1.0e-5);
        assert_near(ours.w(), oracle.w, 1.0e-5);
    }

    #[test]
    fn test_rotate_vector_matches_glam() {
        let q = Quaternion::from_euler(0.5, 1.2, -0.7);
        let v = Vec4::new(1.5, -3.0, 0.25, 0.0);
        let ours = q.rotate_vector3(v);
        let oracle = to_glam(q) * glam::Vec3::new(v.x, v.y, v.z);
        assert_near(ours.x, oracle.x, 1.0e-4);
        assert_near(ours.y, oracle.y, 1.0e-4);
        assert_near(ours.z, oracle.z, 1.0e-4);
    }

    #[test]
    fn test_euler_composition_order() {
        let (x, y, z) = (0.4, -0.9, 1.7);
        let composed = Quaternion::from_axis_angle(Vec4::UNIT_X, x)
            * Quaternion::from_axis_angle(Vec4::UNIT_Y, y)
            * Quaternion::from_axis_angle(Vec4::UNIT_Z, z);
        assert_same_rotation(Quaternion::from_euler(x, y, z), composed, 1.0e-5);
    }

    #[test]
    fn test_conjugate_undoes_rotation() {
        let q = Quaternion::from_euler(1.0, 0.5, -0.25);
        let v = Vec4::new(2.0, 0.0, -1.0, 0.0);
        let back = q.conjugate().rotate_vector3(q.rotate_vector3(v));
        assert!(back.is_near_equal(v, 1.0e-4));
    }

    #[test]
    fn test_inverse_of_unit_equals_conjugate() {
        let q = Quaternion::from_euler(0.2, 0.4, 0.6);
        let inv = q.inverse();
        let conj = q.conjugate();
        assert!(inv.to_vec4().is_near_equal(conj.to_vec4(), 1.0e-5));
        assert_same_rotation(q * inv, Quaternion::IDENTITY, 1.0e-4);
    }

    #[test]
    fn test_inverse_of_near_zero_is_zero() {
        let degenerate = Quaternion::from_xyzw(1.0e-8, 0.0, -1.0e-8, 0.0);
        assert_eq!(degenerate.inverse(), Quaternion::ZERO);
    }

    #[test]
    fn test_shortest_path_flips_negative_w() {
        let q = Quaternion::from_xyzw(0.1, 0.2, 0.3, -0.5);
        let corrected = q.to_shortest_path();
        assert!(corrected.w() > 0.0);
        assert_eq!(corrected, -q);
        assert_eq!(corrected.to_shortest_path(), corrected);
    }

    #[test]
    fn test_normalize_fast_close_to_exact() {
        let q = Quaternion::from_xyzw(3.0, -1.0, 2.0, 0.5);
        let exact = q.normalize();
        let fast = q.normalize_fast();
        assert!(fast.to_vec4().is_near_equal(exact.to_vec4(), 1.0e-3));
        assert_near(fast.length(), 1.0, 1.0e-3);
    }

    #[test]
    fn test_rotation_between_general() {
        let from = Vec4::new(1.0, 2.0, -0.5, 0.0).normalize3();
        let to = Vec4::new(-0.3, 1.0, 4.0, 0.0).normalize3();
        let q = Quaternion::from_rotation_between(from, to);
        assert!(q.rotate_vector3(from).is_near_equal(to, 1.0e-4));
    }

    #[test]
    fn test_rotation_between_parallel_is_identity() {
        let v = Vec4::new(0.0, 1.0, 0.0, 0.0);
        assert_eq!(Quaternion::from_rotation_between(v, v), Quaternion::IDENTITY);
    }

    #[test]
    fn test_rotation_between_antiparallel_is_half_turn() {
        for v in [Vec4::UNIT_X, Vec4::UNIT_Y, Vec4::UNIT_Z] {
            let q = Quaternion::from_rotation_between(v, -v);
            assert!(q.is_normalized());
            assert_near(q.w(), 0.0, TEST_EPSILON);
            assert!(q.rotate_vector3(v).is_near_equal(-v, 1.0e-4), "axis {v:?}");
        }
    }

    #[test]
    fn test_matrix_rows_roundtrip_trace_positive() {
        let q = Quaternion::from_euler(0.3, 0.2, 0.1);
        let m = crate::Matrix4x4::from_quaternion(q);
        let extracted = Quaternion::from_rotation_matrix_rows(m.row(0), m.row(1), m.row(2));
        assert_same_rotation(q, extracted, 1.0e-4);
    }

    #[test]
    fn test_matrix_rows_roundtrip_trace_negative_branches() {
        // Half-turns about each axis drive the trace to -1 and exercise all
        // three largest-diagonal branches.
        for axis in [Vec4::UNIT_X, Vec4::UNIT_Y, Vec4::UNIT_Z] {
            let q = Quaternion::from_axis_angle(axis, std::f32::consts::PI - 0.01);
            let m = crate::Matrix4x4::from_quaternion(q);
            let extracted = Quaternion::from_rotation_matrix_rows(m.row(0), m.row(1), m.row(2));
            assert_same_rotation(q, extracted, 1.0e-4);
        }
    }

    #[test]
    fn test_nlerp_endpoints() {
        let a = Quaternion::from_euler(0.1, 0.2, 0.3);
        let b = Quaternion::from_euler(-0.5, 0.9, 1.4);
        assert_same_rotation(a.nlerp(b, 0.0), a, 1.0e-5);
        assert_same_rotation(a.nlerp(b, 1.0), b, 1.0e-5);
    }

    #[test]
    fn test_slerp_boundaries() {
        let a = Quaternion::from_euler(0.1, -0.4, 0.8);
        let b = Quaternion::from_euler(1.1, 0.3, -0.2);
        assert_same_rotation(a.slerp(b, 0.0), a, 1.0e-5);
        assert_same_rotation(a.slerp(b, 1.0), b, 1.0e-5);
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert_same_rotation(a.slerp(a, t), a, 1.0e-5);
        }
    }

    #[test]
    fn test_slerp_takes_shortest_path() {
        let a = Quaternion::from_axis_angle(Vec4::UNIT_Y, 0.1);
        let b = -Quaternion::from_axis_angle(Vec4::UNIT_Y, 0.3);
        // Despite the sign flip on b, the midpoint stays on the short arc.
        let mid = a.slerp(b, 0.5);
        let expected = Quaternion::from_axis_angle(Vec4::UNIT_Y, 0.2);
        assert_same_rotation(mid, expected, 1.0e-4);
    }

    #[test]
    fn test_slerp_halfway_angle() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(Vec4::UNIT_Z, 1.0);
        let mid = a.slerp(b, 0.5);
        let expected = Quaternion::from_axis_angle(Vec4::UNIT_Z, 0.5);
        assert_same_rotation(mid, expected, 1.0e-4);
    }

    #[test]
    fn test_squad_hits_inner_keys_at_midpoint_weighting() {
        let q0 = Quaternion::from_axis_angle(Vec4::UNIT_Z, 0.0);
        let q1 = Quaternion::from_axis_angle(Vec4::UNIT_Z, 0.2);
        let q2 = Quaternion::from_axis_angle(Vec4::UNIT_Z, 0.4);
        let q3 = Quaternion::from_axis_angle(Vec4::UNIT_Z, 0.6);

        // Boundary behaviour: t=0 -> q0, t=1 -> q3 (the 2t(1-t) blend
        // weight vanishes at both ends).
        assert_same_rotation(Quaternion::squad(q0, q1, q2, q3, 0.0), q0, 1.0e-5);
        assert_same_rotation(Quaternion::squad(q0, q1, q2, q3, 1.0), q3, 1.0e-5);

        // Midpoint blends halfway between slerp(q0,q3,.5) and slerp(q1,q2,.5),
        // which for this coaxial setup is exactly 0.3 rad about Z.
        let mid = Quaternion::squad(q0, q1, q2, q3, 0.5);
        let expected = Quaternion::from_axis_angle(Vec4::UNIT_Z, 0.3);
        assert_same_rotation(mid, expected, 1.0e-4);
    }

    #[test]
    fn test_angular_distance_sign_insensitive() {
        let q = Quaternion::from_euler(0.3, 0.6, -0.9);
        assert_near(q.angular_distance(-q), 0.0, 1.0e-6);
        let half_turn = Quaternion::from_axis_angle(Vec4::UNIT_X, std::f32::consts::PI);
        // acos(|dot|) reports half the rotation angle separating the two.
        assert_near(Quaternion::IDENTITY.angular_distance(half_turn), std::f32::consts::FRAC_PI_2, 1.0e-5);
    }

    #[test]
    fn test_byte_layout_xyzw_floats() {
        let q = Quaternion::from_xyzw(0.5, -0.5, 0.25, 1.0);
        let bytes = q.to_bytes();
        assert_eq!(&bytes[0..4], &0.5f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1.0f32.to_le_bytes());
        assert_eq!(Quaternion::from_bytes(bytes), q);
        assert_eq!(bytemuck::bytes_of(&q), &bytes);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let q = Quaternion::from_euler(0.1, 0.2, 0.3);
        let bytes = rmp_serde::to_vec(&q).unwrap();
        let restored: Quaternion = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(q, restored);
    }
}

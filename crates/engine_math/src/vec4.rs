//! Aligned 4-lane float vector.
//!
//! [`Vec4`] is the storage primitive for every other math type in this
//! crate: [`Quaternion`](crate::Quaternion) reinterprets one, and
//! [`Matrix4x4`](crate::Matrix4x4) is four of them. All operations are total
//! value computations — no allocation, no shared state, no side effects.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::contract_assert;
use crate::scalar;

/// A 4-lane single-precision vector, 16-byte aligned.
///
/// "Normalised" is a caller-asserted property, not a structural invariant:
/// operations that require unit inputs state so and contract-check them in
/// debug builds.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

// SAFETY: four packed f32 lanes, 16-byte size and alignment, no padding.
unsafe impl Zeroable for Vec4 {}
unsafe impl Pod for Vec4 {}

/// Per-lane boolean mask produced by the `cmp_*` comparisons and consumed by
/// [`Vec4::select`] for branchless blends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mask4 {
    pub x: bool,
    pub y: bool,
    pub z: bool,
    pub w: bool,
}

impl Mask4 {
    /// Create a mask from four lane flags.
    #[must_use]
    pub const fn new(x: bool, y: bool, z: bool, w: bool) -> Self {
        Self { x, y, z, w }
    }

    /// A mask with the same flag in every lane.
    #[must_use]
    pub const fn splat(flag: bool) -> Self {
        Self::new(flag, flag, flag, flag)
    }

    /// True if every lane is set.
    #[must_use]
    pub const fn all(self) -> bool {
        self.x && self.y && self.z && self.w
    }

    /// True if any lane is set.
    #[must_use]
    pub const fn any(self) -> bool {
        self.x || self.y || self.z || self.w
    }
}

impl Vec4 {
    /// All lanes zero.
    pub const ZERO: Self = Self::splat(0.0);
    /// All lanes one.
    pub const ONE: Self = Self::splat(1.0);
    /// (1, 0, 0, 0)
    pub const UNIT_X: Self = Self::new(1.0, 0.0, 0.0, 0.0);
    /// (0, 1, 0, 0)
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0, 0.0);
    /// (0, 0, 1, 0)
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0, 0.0);
    /// (0, 0, 0, 1)
    pub const UNIT_W: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// (-1, 0, 0, 0)
    pub const NEG_UNIT_X: Self = Self::new(-1.0, 0.0, 0.0, 0.0);
    /// (0, -1, 0, 0)
    pub const NEG_UNIT_Y: Self = Self::new(0.0, -1.0, 0.0, 0.0);
    /// (0, 0, -1, 0)
    pub const NEG_UNIT_Z: Self = Self::new(0.0, 0.0, -1.0, 0.0);
    /// (0, 0, 0, -1)
    pub const NEG_UNIT_W: Self = Self::new(0.0, 0.0, 0.0, -1.0);
    /// (0, 0, 0, 1) — the homogeneous point origin / identity translation row.
    pub const W_ONE: Self = Self::UNIT_W;

    /// Create a vector from four lanes.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// A vector with the same value in every lane.
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Create a vector from a lane array in (x, y, z, w) order.
    #[must_use]
    pub const fn from_array(lanes: [f32; 4]) -> Self {
        Self::new(lanes[0], lanes[1], lanes[2], lanes[3])
    }

    /// The lanes as an array in (x, y, z, w) order.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Three-component dot product; the w lanes are ignored.
    #[must_use]
    pub fn dot3(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Four-component dot product.
    #[must_use]
    pub fn dot4(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    /// Three-component cross product. The result's w lane is zero.
    #[must_use]
    pub fn cross3(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
            0.0,
        )
    }

    /// Squared length of the (x, y, z) part.
    #[must_use]
    pub fn length3_squared(self) -> f32 {
        self.dot3(self)
    }

    /// Squared length over all four lanes.
    #[must_use]
    pub fn length4_squared(self) -> f32 {
        self.dot4(self)
    }

    /// Length of the (x, y, z) part.
    #[must_use]
    pub fn length3(self) -> f32 {
        self.length3_squared().sqrt()
    }

    /// Length over all four lanes.
    #[must_use]
    pub fn length4(self) -> f32 {
        self.length4_squared().sqrt()
    }

    /// Normalise the (x, y, z) part; the w lane is preserved.
    ///
    /// Near-zero length is a contract violation; optimised builds return
    /// [`Vec4::ZERO`] instead of panicking.
    #[must_use]
    pub fn normalize3(self) -> Self {
        let length_squared = self.length3_squared();
        contract_assert!(
            length_squared > scalar::EPSILON * scalar::EPSILON,
            "normalize3 of a near-zero vector"
        );
        if length_squared <= scalar::EPSILON * scalar::EPSILON {
            return Self::ZERO;
        }
        let inv = 1.0 / length_squared.sqrt();
        Self::new(self.x * inv, self.y * inv, self.z * inv, self.w)
    }

    /// Normalise all four lanes.
    ///
    /// Near-zero length is a contract violation; optimised builds return
    /// [`Vec4::ZERO`] instead of panicking.
    #[must_use]
    pub fn normalize4(self) -> Self {
        let length_squared = self.length4_squared();
        contract_assert!(
            length_squared > scalar::EPSILON * scalar::EPSILON,
            "normalize4 of a near-zero vector"
        );
        if length_squared <= scalar::EPSILON * scalar::EPSILON {
            return Self::ZERO;
        }
        self * (1.0 / length_squared.sqrt())
    }

    /// Per-lane absolute value.
    #[must_use]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs(), self.w.abs())
    }

    /// Per-lane minimum.
    #[must_use]
    pub fn min(self, rhs: Self) -> Self {
        Self::new(
            self.x.min(rhs.x),
            self.y.min(rhs.y),
            self.z.min(rhs.z),
            self.w.min(rhs.w),
        )
    }

    /// Per-lane maximum.
    #[must_use]
    pub fn max(self, rhs: Self) -> Self {
        Self::new(
            self.x.max(rhs.x),
            self.y.max(rhs.y),
            self.z.max(rhs.z),
            self.w.max(rhs.w),
        )
    }

    /// Linear interpolation, `t = 0` → self, `t = 1` → rhs.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f32) -> Self {
        self + (rhs - self) * t
    }

    /// Permute lanes by compile-time indices, e.g.
    /// `v.shuffle::<3, 2, 1, 0>()` reverses the lane order. Indices outside
    /// 0..=3 are rejected at compile time.
    #[must_use]
    pub fn shuffle<const X: usize, const Y: usize, const Z: usize, const W: usize>(self) -> Self {
        const {
            assert!(X < 4 && Y < 4 && Z < 4 && W < 4, "shuffle lane out of range");
        }
        let lanes = self.to_array();
        Self::new(lanes[X], lanes[Y], lanes[Z], lanes[W])
    }

    /// Branchless per-lane blend: set lanes take `if_true`, clear lanes take
    /// `if_false`.
    #[must_use]
    pub fn select(mask: Mask4, if_true: Self, if_false: Self) -> Self {
        Self::new(
            if mask.x { if_true.x } else { if_false.x },
            if mask.y { if_true.y } else { if_false.y },
            if mask.z { if_true.z } else { if_false.z },
            if mask.w { if_true.w } else { if_false.w },
        )
    }

    /// Per-lane `<` comparison.
    #[must_use]
    pub fn cmp_lt(self, rhs: Self) -> Mask4 {
        Mask4::new(self.x < rhs.x, self.y < rhs.y, self.z < rhs.z, self.w < rhs.w)
    }

    /// Per-lane `<=` comparison.
    #[must_use]
    pub fn cmp_le(self, rhs: Self) -> Mask4 {
        Mask4::new(
            self.x <= rhs.x,
            self.y <= rhs.y,
            self.z <= rhs.z,
            self.w <= rhs.w,
        )
    }

    /// Per-lane `>` comparison.
    #[must_use]
    pub fn cmp_gt(self, rhs: Self) -> Mask4 {
        Mask4::new(self.x > rhs.x, self.y > rhs.y, self.z > rhs.z, self.w > rhs.w)
    }

    /// Per-lane `>=` comparison.
    #[must_use]
    pub fn cmp_ge(self, rhs: Self) -> Mask4 {
        Mask4::new(
            self.x >= rhs.x,
            self.y >= rhs.y,
            self.z >= rhs.z,
            self.w >= rhs.w,
        )
    }

    /// Per-lane exact equality comparison.
    #[must_use]
    pub fn cmp_eq(self, rhs: Self) -> Mask4 {
        Mask4::new(
            self.x == rhs.x,
            self.y == rhs.y,
            self.z == rhs.z,
            self.w == rhs.w,
        )
    }

    /// True if every lane differs from `rhs` by at most `epsilon`.
    #[must_use]
    pub fn is_near_equal(self, rhs: Self, epsilon: f32) -> bool {
        let diff = (self - rhs).abs();
        diff.cmp_le(Self::splat(epsilon)).all()
    }

    /// True if the (x, y, z) part is within `epsilon` of zero length.
    #[must_use]
    pub fn is_near_zero3(self, epsilon: f32) -> bool {
        self.length3_squared() <= epsilon * epsilon
    }

    /// True if all four lanes are within `epsilon` of zero length.
    #[must_use]
    pub fn is_near_zero4(self, epsilon: f32) -> bool {
        self.length4_squared() <= epsilon * epsilon
    }

    /// True if the (x, y, z) part is unit length within [`scalar::UNIT_EPSILON`].
    #[must_use]
    pub fn is_normalized3(self) -> bool {
        (self.length3_squared() - 1.0).abs() <= scalar::UNIT_EPSILON
    }

    /// True if all four lanes together are unit length within
    /// [`scalar::UNIT_EPSILON`].
    #[must_use]
    pub fn is_normalized4(self) -> bool {
        (self.length4_squared() - 1.0).abs() <= scalar::UNIT_EPSILON
    }

    /// True if the (x, y, z) parts of the two vectors are parallel (or
    /// anti-parallel) within `epsilon`, measured as the cross-product
    /// magnitude. Intended for unit-length direction vectors.
    #[must_use]
    pub fn is_parallel_to(self, rhs: Self, epsilon: f32) -> bool {
        self.cross3(rhs).length3_squared() <= epsilon * epsilon
    }

    /// Serialise as 16 bytes: four consecutive little-endian IEEE-754 floats
    /// in (x, y, z, w) order.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for (i, lane) in self.to_array().into_iter().enumerate() {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&lane.to_le_bytes());
        }
        bytes
    }

    /// Inverse of [`Vec4::to_bytes`].
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let lane = |i: usize| {
            f32::from_le_bytes([bytes[i * 4], bytes[i * 4 + 1], bytes[i * 4 + 2], bytes[i * 4 + 3]])
        };
        Self::new(lane(0), lane(1), lane(2), lane(3))
    }
}

impl Add for Vec4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Vec4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl Mul for Vec4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z, self.w * rhs.w)
    }
}

impl Div for Vec4 {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z, self.w / rhs.w)
    }
}

impl Mul<f32> for Vec4 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar, self.w * scalar)
    }
}

impl Div<f32> for Vec4 {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar, self.w / scalar)
    }
}

impl Neg for Vec4 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl AddAssign for Vec4 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec4 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<f32> for Vec4 {
    fn mul_assign(&mut self, scalar: f32) {
        *self = *self * scalar;
    }
}

impl DivAssign<f32> for Vec4 {
    fn div_assign(&mut self, scalar: f32) {
        *self = *self / scalar;
    }
}

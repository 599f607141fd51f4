//! Row-major 4×4 affine transforms.
//!
//! [`Matrix4x4`] stores four [`Vec4`] rows and uses the row-vector
//! convention: points and directions transform as `v * M`, translation
//! lives in row 3, and `A * B` applies `A` first, then `B`. Note the
//! mirror-image relationship with [`Quaternion`] composition: converting
//! `a * b` to a matrix yields `from_quaternion(b) * from_quaternion(a)`.

use std::ops::Mul;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::contract_assert;
use crate::quaternion::Quaternion;
use crate::vec4::Vec4;

/// A row-major 4×4 transform matrix.
///
/// Rows 0–2 carry rotation and scale (they are orthogonal unit vectors iff
/// the matrix encodes a pure rotation); row 3 carries translation with
/// w = 1 for affine use. The w-lane convention on transformed vectors is
/// 0 = direction, 1 = point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4x4 {
    rows: [Vec4; 4],
}

// SAFETY: four Pod rows, no padding (64 bytes, 16-byte aligned).
unsafe impl Zeroable for Matrix4x4 {}
unsafe impl Pod for Matrix4x4 {}

/// The parts recovered by [`Matrix4x4::decompose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    /// Row-3 translation, w = 1.
    pub translation: Vec4,
    /// The pure rotation left after scale and shear removal.
    pub rotation: Quaternion,
    /// Per-axis scale in the x, y, z lanes (w = 0). All three lanes come
    /// back negated together when the matrix contains a coordinate flip.
    pub scale: Vec4,
    /// Shear factors in (xy, xz, yz) order.
    pub shear: [f32; 3],
}

/// Why a decomposition was not possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecomposeError {
    /// A row's scale factor is so small its reciprocal overflows `f32`.
    #[error("degenerate scale on row {row}")]
    DegenerateScale {
        /// The offending row index (0–2).
        row: usize,
    },
}

/// True when dividing by `scale` would overflow to infinity.
fn scale_is_degenerate(scale: f32) -> bool {
    !(scale.abs() > 1.0 / f32::MAX)
}

/// Graphics Gems scale/shear extraction.
///
/// Orthogonalises `rows` in place via Gram-Schmidt and returns the scale
/// and shear that were removed. The rows are first normalised by their
/// largest absolute element for numerical stability; the extracted scale is
/// re-multiplied by that factor before returning.
fn extract_scale_and_shear(rows: &mut [Vec4; 3]) -> Result<(Vec4, [f32; 3]), DecomposeError> {
    let mut max_abs = 0.0f32;
    for row in rows.iter() {
        for lane in [row.x, row.y, row.z] {
            max_abs = max_abs.max(lane.abs());
        }
    }
    if max_abs != 0.0 {
        for row in rows.iter_mut() {
            *row = *row / max_abs;
        }
    }

    let mut scale = [0.0f32; 3];
    let mut shear = [0.0f32; 3];

    scale[0] = rows[0].length3();
    if scale_is_degenerate(scale[0]) {
        return Err(DecomposeError::DegenerateScale { row: 0 });
    }
    rows[0] = rows[0] / scale[0];

    shear[0] = rows[0].dot3(rows[1]);
    rows[1] = rows[1] - rows[0] * shear[0];
    scale[1] = rows[1].length3();
    if scale_is_degenerate(scale[1]) {
        return Err(DecomposeError::DegenerateScale { row: 1 });
    }
    rows[1] = rows[1] / scale[1];
    shear[0] /= scale[1];

    shear[1] = rows[0].dot3(rows[2]);
    rows[2] = rows[2] - rows[0] * shear[1];
    shear[2] = rows[1].dot3(rows[2]);
    rows[2] = rows[2] - rows[1] * shear[2];
    scale[2] = rows[2].length3();
    if scale_is_degenerate(scale[2]) {
        return Err(DecomposeError::DegenerateScale { row: 2 });
    }
    rows[2] = rows[2] / scale[2];
    shear[1] /= scale[2];
    shear[2] /= scale[2];

    // A negative determinant means the transform flips the coordinate
    // system; the convention is to negate all three scales and rows
    // together rather than report an error.
    let determinant = rows[0].dot3(rows[1].cross3(rows[2]));
    if determinant < 0.0 {
        for factor in &mut scale {
            *factor = -*factor;
        }
        for row in rows.iter_mut() {
            *row = -*row;
        }
    }

    for factor in &mut scale {
        *factor *= max_abs;
    }
    Ok((Vec4::new(scale[0], scale[1], scale[2], 0.0), shear))
}

impl Matrix4x4 {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rows: [Vec4::UNIT_X, Vec4::UNIT_Y, Vec4::UNIT_Z, Vec4::UNIT_W],
    };

    /// The all-zero matrix.
    pub const ZERO: Self = Self {
        rows: [Vec4::ZERO; 4],
    };

    /// Build from four rows.
    #[must_use]
    pub const fn from_rows(rows: [Vec4; 4]) -> Self {
        Self { rows }
    }

    /// Build from 16 explicit values, row-major.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn from_elements(
        m00: f32, m01: f32, m02: f32, m03: f32,
        m10: f32, m11: f32, m12: f32, m13: f32,
        m20: f32, m21: f32, m22: f32, m23: f32,
        m30: f32, m31: f32, m32: f32, m33: f32,
    ) -> Self {
        Self::from_rows([
            Vec4::new(m00, m01, m02, m03),
            Vec4::new(m10, m11, m12, m13),
            Vec4::new(m20, m21, m22, m23),
            Vec4::new(m30, m31, m32, m33),
        ])
    }

    /// Rotation(+scale) block from three basis vectors, identity translation.
    #[must_use]
    pub fn from_basis(x_axis: Vec4, y_axis: Vec4, z_axis: Vec4) -> Self {
        Self::from_basis_translation(x_axis, y_axis, z_axis, Vec4::ZERO)
    }

    /// Basis vectors plus a translation row.
    #[must_use]
    pub fn from_basis_translation(x_axis: Vec4, y_axis: Vec4, z_axis: Vec4, translation: Vec4) -> Self {
        Self::from_rows([
            Vec4::new(x_axis.x, x_axis.y, x_axis.z, 0.0),
            Vec4::new(y_axis.x, y_axis.y, y_axis.z, 0.0),
            Vec4::new(z_axis.x, z_axis.y, z_axis.z, 0.0),
            Vec4::new(translation.x, translation.y, translation.z, 1.0),
        ])
    }

    /// Pure rotation from a unit quaternion.
    #[must_use]
    pub fn from_quaternion(q: Quaternion) -> Self {
        contract_assert!(q.is_normalized(), "from_quaternion requires a unit quaternion");
        let (x, y, z, w) = (q.x(), q.y(), q.z(), q.w());
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        Self::from_rows([
            Vec4::new(1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy), 0.0),
            Vec4::new(2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx), 0.0),
            Vec4::new(2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy), 0.0),
            Vec4::UNIT_W,
        ])
    }

    /// Rotation plus translation.
    #[must_use]
    pub fn from_quaternion_translation(q: Quaternion, translation: Vec4) -> Self {
        let mut m = Self::from_quaternion(q);
        m.set_translation(translation);
        m
    }

    /// Scale, then rotate, then translate.
    #[must_use]
    pub fn from_scale_quaternion_translation(scale: Vec4, q: Quaternion, translation: Vec4) -> Self {
        let rotation = Self::from_quaternion(q);
        Self::from_rows([
            rotation.rows[0] * scale.x,
            rotation.rows[1] * scale.y,
            rotation.rows[2] * scale.z,
            Vec4::new(translation.x, translation.y, translation.z, 1.0),
        ])
    }

    /// Rotation from Euler angles; matches
    /// [`Quaternion::from_euler`] exactly.
    #[must_use]
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        Self::from_quaternion(Quaternion::from_euler(x, y, z))
    }

    /// Rotation of `radians` about a normalised axis.
    #[must_use]
    pub fn from_axis_angle(axis: Vec4, radians: f32) -> Self {
        Self::from_quaternion(Quaternion::from_axis_angle(axis, radians))
    }

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: Vec4) -> Self {
        let mut m = Self::IDENTITY;
        m.set_translation(translation);
        m
    }

    /// Pure per-axis scale from the x, y, z lanes.
    #[must_use]
    pub fn from_scale(scale: Vec4) -> Self {
        Self::from_rows([
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            Vec4::UNIT_W,
        ])
    }

    /// One row of the matrix.
    #[must_use]
    pub const fn row(&self, index: usize) -> Vec4 {
        self.rows[index]
    }

    /// Replace one row.
    pub fn set_row(&mut self, index: usize, row: Vec4) {
        self.rows[index] = row;
    }

    /// One element, by (row, column).
    #[must_use]
    pub fn element(&self, row: usize, column: usize) -> f32 {
        self.rows[row].to_array()[column]
    }

    /// Replace one element, by (row, column).
    pub fn set_element(&mut self, row: usize, column: usize, value: f32) {
        let mut lanes = self.rows[row].to_array();
        lanes[column] = value;
        self.rows[row] = Vec4::from_array(lanes);
    }

    /// The translation row with w forced to 1.
    #[must_use]
    pub fn translation(&self) -> Vec4 {
        let t = self.rows[3];
        Vec4::new(t.x, t.y, t.z, 1.0)
    }

    /// Replace the translation row (w is forced to 1).
    pub fn set_translation(&mut self, translation: Vec4) {
        self.rows[3] = Vec4::new(translation.x, translation.y, translation.z, 1.0);
    }

    /// Extract the pure rotation of the upper-left 3×3 block as a
    /// quaternion.
    ///
    /// Tolerates (uniform or mild non-uniform) scale on the rows; the
    /// result is re-normalised. Zero-length rows violate the contract.
    #[must_use]
    pub fn rotation(&self) -> Quaternion {
        Quaternion::from_rotation_matrix_rows(self.rows[0], self.rows[1], self.rows[2])
    }

    /// Separate translation, rotation, scale, and shear.
    ///
    /// # Errors
    ///
    /// [`DecomposeError::DegenerateScale`] when a row's scale cannot be
    /// divided out; [`Matrix4x4::scale`] documents the fallback used then.
    pub fn decompose(&self) -> Result<Decomposition, DecomposeError> {
        let mut rows = [self.rows[0], self.rows[1], self.rows[2]];
        let (scale, shear) = extract_scale_and_shear(&mut rows)?;
        Ok(Decomposition {
            translation: self.translation(),
            rotation: Quaternion::from_rotation_matrix_rows(rows[0], rows[1], rows[2]),
            scale,
            shear,
        })
    }

    /// The per-axis scale of the transform.
    ///
    /// Uses the full decomposition; when that fails the naive per-row
    /// length is the documented fallback (it ignores shear and loses the
    /// flip sign).
    #[must_use]
    pub fn scale(&self) -> Vec4 {
        match self.decompose() {
            Ok(parts) => parts.scale,
            Err(error) => {
                tracing::warn!(%error, "matrix decomposition failed, using per-row scale fallback");
                Vec4::new(
                    self.rows[0].length3(),
                    self.rows[1].length3(),
                    self.rows[2].length3(),
                    0.0,
                )
            }
        }
    }

    /// Element-wise transpose.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let m = &self.rows;
        Self::from_elements(
            m[0].x, m[1].x, m[2].x, m[3].x,
            m[0].y, m[1].y, m[2].y, m[3].y,
            m[0].z, m[1].z, m[2].z, m[3].z,
            m[0].w, m[1].w, m[2].w, m[3].w,
        )
    }

    /// The six 2×2 sub-determinants of rows 0–1 and of rows 2–3, shared by
    /// [`Matrix4x4::determinant`] and [`Matrix4x4::inverse`].
    fn sub_determinants(&self) -> ([f32; 6], [f32; 6]) {
        let a = |r: usize, c: usize| self.element(r, c);
        let top = [
            a(0, 0) * a(1, 1) - a(0, 1) * a(1, 0),
            a(0, 0) * a(1, 2) - a(0, 2) * a(1, 0),
            a(0, 0) * a(1, 3) - a(0, 3) * a(1, 0),
            a(0, 1) * a(1, 2) - a(0, 2) * a(1, 1),
            a(0, 1) * a(1, 3) - a(0, 3) * a(1, 1),
            a(0, 2) * a(1, 3) - a(0, 3) * a(1, 2),
        ];
        let bottom = [
            a(2, 0) * a(3, 1) - a(2, 1) * a(3, 0),
            a(2, 0) * a(3, 2) - a(2, 2) * a(3, 0),
            a(2, 0) * a(3, 3) - a(2, 3) * a(3, 0),
            a(2, 1) * a(3, 2) - a(2, 2) * a(3, 1),
            a(2, 1) * a(3, 3) - a(2, 3) * a(3, 1),
            a(2, 2) * a(3, 3) - a(2, 3) * a(3, 2),
        ];
        (top, bottom)
    }

    /// Determinant by cofactor expansion along the bottom two rows.
    #[must_use]
    pub fn determinant(&self) -> f32 {
        let (s, c) = self.sub_determinants();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// Inverse via the adjugate built from twelve 2×2 sub-determinants.
    ///
    /// There is no guard against a vanishing determinant: a singular input
    /// produces non-finite garbage, loudly in debug via downstream contract
    /// checks, silently in release. That matches the callers' policy — they
    /// only invert matrices they constructed invertible.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let a = |r: usize, c: usize| self.element(r, c);
        let (s, cf) = self.sub_determinants();
        let det = s[0] * cf[5] - s[1] * cf[4] + s[2] * cf[3] + s[3] * cf[2] - s[4] * cf[1] + s[5] * cf[0];
        let inv_det = 1.0 / det;

        // Cofactors, already laid out transposed (adjugate rows).
        Self::from_rows([
            Vec4::new(
                a(1, 1) * cf[5] - a(1, 2) * cf[4] + a(1, 3) * cf[3],
                -(a(0, 1) * cf[5] - a(0, 2) * cf[4] + a(0, 3) * cf[3]),
                a(3, 1) * s[5] - a(3, 2) * s[4] + a(3, 3) * s[3],
                -(a(2, 1) * s[5] - a(2, 2) * s[4] + a(2, 3) * s[3]),
            ) * inv_det,
            Vec4::new(
                -(a(1, 0) * cf[5] - a(1, 2) * cf[2] + a(1, 3) * cf[1]),
                a(0, 0) * cf[5] - a(0, 2) * cf[2] + a(0, 3) * cf[1],
                -(a(3, 0) * s[5] - a(3, 2) * s[2] + a(3, 3) * s[1]),
                a(2, 0) * s[5] - a(2, 2) * s[2] + a(2, 3) * s[1],
            ) * inv_det,
            Vec4::new(
                a(1, 0) * cf[4] - a(1, 1) * cf[2] + a(1, 3) * cf[0],
                -(a(0, 0) * cf[4] - a(0, 1) * cf[2] + a(0, 3) * cf[0]),
                a(3, 0) * s[4] - a(3, 1) * s[2] + a(3, 3) * s[0],
                -(a(2, 0) * s[4] - a(2, 1) * s[2] + a(2, 3) * s[0]),
            ) * inv_det,
            Vec4::new(
                -(a(1, 0) * cf[3] - a(1, 1) * cf[1] + a(1, 2) * cf[0]),
                a(0, 0) * cf[3] - a(0, 1) * cf[1] + a(0, 2) * cf[0],
                -(a(3, 0) * s[3] - a(3, 1) * s[1] + a(3, 2) * s[0]),
                a(2, 0) * s[3] - a(2, 1) * s[1] + a(2, 2) * s[0],
            ) * inv_det,
        ])
    }

    /// Transform a point: w is taken as 1 and the result is divided through
    /// by its w lane (returned with w = 1).
    #[must_use]
    pub fn transform_point(&self, point: Vec4) -> Vec4 {
        let r = self.rows[0] * point.x + self.rows[1] * point.y + self.rows[2] * point.z + self.rows[3];
        Vec4::new(r.x / r.w, r.y / r.w, r.z / r.w, 1.0)
    }

    /// Transform a direction: w is taken as 0, translation does not apply,
    /// no division (returned with w = 0).
    #[must_use]
    pub fn transform_vector3(&self, v: Vec4) -> Vec4 {
        let r = self.rows[0] * v.x + self.rows[1] * v.y + self.rows[2] * v.z;
        Vec4::new(r.x, r.y, r.z, 0.0)
    }

    /// Full four-lane transform, no division.
    #[must_use]
    pub fn transform_vector4(&self, v: Vec4) -> Vec4 {
        self.rows[0] * v.x + self.rows[1] * v.y + self.rows[2] * v.z + self.rows[3] * v.w
    }

    /// Exact equality with the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True if rows 0–2 are mutually orthogonal within `epsilon`.
    #[must_use]
    pub fn is_orthogonal(&self, epsilon: f32) -> bool {
        self.rows[0].dot3(self.rows[1]).abs() <= epsilon
            && self.rows[0].dot3(self.rows[2]).abs() <= epsilon
            && self.rows[1].dot3(self.rows[2]).abs() <= epsilon
    }

    /// True if rows 0–2 are orthogonal and unit length within `epsilon`.
    #[must_use]
    pub fn is_orthonormal(&self, epsilon: f32) -> bool {
        self.is_orthogonal(epsilon)
            && (self.rows[0].length3_squared() - 1.0).abs() <= epsilon
            && (self.rows[1].length3_squared() - 1.0).abs() <= epsilon
            && (self.rows[2].length3_squared() - 1.0).abs() <= epsilon
    }

    /// Serialise as 64 bytes: 16 consecutive little-endian IEEE-754 floats,
    /// row-major, rows 0..3.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        for (i, row) in self.rows.iter().enumerate() {
            bytes[i * 16..i * 16 + 16].copy_from_slice(&row.to_bytes());
        }
        bytes
    }

    /// Inverse of [`Matrix4x4::to_bytes`].
    #[must_use]
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        let row = |i: usize| {
            let mut chunk = [0u8; 16];
            chunk.copy_from_slice(&bytes[i * 16..i * 16 + 16]);
            Vec4::from_bytes(chunk)
        };
        Self::from_rows([row(0), row(1), row(2), row(3)])
    }
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4x4 {
    type Output = Self;

    /// Row-vector composition: `v * (a * b) == (v * a) * b`.
    fn mul(self, rhs: Self) -> Self {
        let compose = |row: Vec4| {
            rhs.rows[0] * row.x + rhs.rows[1] * row.y + rhs.rows[2] * row.z + rhs.rows[3] * row.w
        };
        Self::from_rows([
            compose(self.rows[0]),
            compose(self.rows[1]),
            compose(self.rows[2]),
            compose(self.rows[3]),
        ])
    }
}

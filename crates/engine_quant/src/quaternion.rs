//! 48-bit quaternion compression.
//!
//! A unit quaternion's largest-magnitude component is implied by the other
//! three (unit-length identity), so it is dropped: the survivors are packed
//! as 15-bit codes and the dropped component's 2-bit index rides in the top
//! bits of the first two words. Encoding happens once at asset-bake time;
//! decoding runs hot at runtime.

use bytemuck::{Pod, Zeroable};
use engine_math::{Quaternion, contract_assert};
use serde::{Deserialize, Serialize};

use crate::normalized::{decode_unorm, encode_unorm};

/// Lower bound of a non-largest component of a unit quaternion.
const COMPONENT_MIN: f32 = -std::f32::consts::FRAC_1_SQRT_2;

/// Width of the component range `[-1/√2, 1/√2]`.
const COMPONENT_RANGE: f32 = std::f32::consts::SQRT_2;

/// A quaternion compressed to three 16-bit words (47 significant bits).
///
/// Word layout:
///
/// ```text
/// data0: [index bit 1][15-bit component a]
/// data1: [index bit 0][15-bit component b]
/// data2: [unused = 0 ][15-bit component c]
/// ```
///
/// where (a, b, c) are the surviving components in x, y, z, w order and
/// `index` names the dropped one. The surrounding resource format decides
/// which word subset it persists (historically `data0` and `data2`, with
/// `data1` carried separately), so all three words stay individually
/// addressable here.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedQuaternion {
    data0: u16,
    data1: u16,
    data2: u16,
}

// SAFETY: three u16 fields, 6 bytes, 2-byte alignment, no padding.
unsafe impl Zeroable for EncodedQuaternion {}
unsafe impl Pod for EncodedQuaternion {}

/// 15-bit encode over the component range. The clamp absorbs float drift
/// past the theoretical `1/√2` bound.
fn encode_component(value: f32) -> u16 {
    let normalized = ((value - COMPONENT_MIN) / COMPONENT_RANGE).clamp(0.0, 1.0);
    encode_unorm::<15>(normalized)
}

fn decode_component(code: u16) -> f32 {
    COMPONENT_MIN + decode_unorm::<15>(code) * COMPONENT_RANGE
}

impl EncodedQuaternion {
    /// Compress a unit quaternion.
    ///
    /// The largest-|component| index wins (ties resolve to the earliest in
    /// x, y, z, w order) and its sign is divided through the survivors, so
    /// the dropped component decodes as non-negative.
    #[must_use]
    pub fn encode(q: Quaternion) -> Self {
        contract_assert!(q.is_normalized(), "quaternion codec requires unit input");

        let components = [q.x(), q.y(), q.z(), q.w()];
        let mut largest = 0;
        for index in 1..4 {
            if components[index].abs() > components[largest].abs() {
                largest = index;
            }
        }
        let sign = if components[largest] < 0.0 { -1.0 } else { 1.0 };

        let mut stored = [0u16; 3];
        let mut slot = 0;
        for (index, &component) in components.iter().enumerate() {
            if index == largest {
                continue;
            }
            stored[slot] = encode_component(component / sign);
            slot += 1;
        }

        let index = largest as u16;
        Self {
            data0: stored[0] | ((index & 0b10) << 14),
            data1: stored[1] | ((index & 0b01) << 15),
            data2: stored[2],
        }
    }

    /// Decompress back into a unit quaternion.
    ///
    /// The dropped component is rebuilt from the unit-length identity as
    /// `sqrt(1 - Σ squares)` — non-negative by construction. The result may
    /// be the sign-negated twin of the encoded input; both name the same
    /// rotation.
    #[must_use]
    pub fn decode(&self) -> Quaternion {
        let index = (((self.data0 >> 15) & 1) << 1) | ((self.data1 >> 15) & 1);
        let stored = [
            decode_component(self.data0 & 0x7FFF),
            decode_component(self.data1 & 0x7FFF),
            decode_component(self.data2 & 0x7FFF),
        ];
        let sum_of_squares: f32 = stored.iter().map(|c| c * c).sum();
        let dropped = (1.0 - sum_of_squares).max(0.0).sqrt();

        let mut components = [0.0f32; 4];
        let mut slot = 0;
        for (lane, component) in components.iter_mut().enumerate() {
            if lane == index as usize {
                *component = dropped;
            } else {
                *component = stored[slot];
                slot += 1;
            }
        }
        Quaternion::from_xyzw(components[0], components[1], components[2], components[3])
    }

    /// First word: survivor a plus the high bit of the dropped index.
    #[must_use]
    pub const fn data0(&self) -> u16 {
        self.data0
    }

    /// Second word: survivor b plus the low bit of the dropped index.
    #[must_use]
    pub const fn data1(&self) -> u16 {
        self.data1
    }

    /// Third word: survivor c; the top bit is always zero.
    #[must_use]
    pub const fn data2(&self) -> u16 {
        self.data2
    }

    /// All three words in order.
    #[must_use]
    pub const fn words(&self) -> [u16; 3] {
        [self.data0, self.data1, self.data2]
    }

    /// Rebuild from three words, e.g. after the resource layer reassembles
    /// its persisted subset.
    #[must_use]
    pub const fn from_words(words: [u16; 3]) -> Self {
        Self {
            data0: words[0],
            data1: words[1],
            data2: words[2],
        }
    }
}

impl From<Quaternion> for EncodedQuaternion {
    fn from(q: Quaternion) -> Self {
        Self::encode(q)
    }
}

impl From<EncodedQuaternion> for Quaternion {
    fn from(encoded: EncodedQuaternion) -> Self {
        encoded.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_math::Vec4;
    use rand::{Rng, SeedableRng};

    /// Empirical bound for 15-bit components, with headroom.
    const ROUNDTRIP_BOUND: f32 = 0.01;

    #[test]
    fn test_identity_roundtrip() {
        let encoded = EncodedQuaternion::encode(Quaternion::IDENTITY);
        let decoded = encoded.decode();
        assert!(decoded.angular_distance(Quaternion::IDENTITY) < 1.0e-3);
        assert!(decoded.is_normalized());
    }

    #[test]
    fn test_dropped_index_bits_for_w_largest() {
        // Identity drops w (index 3 = 0b11): both top bits set.
        let encoded = EncodedQuaternion::encode(Quaternion::IDENTITY);
        assert_eq!(encoded.data0() >> 15, 1);
        assert_eq!(encoded.data1() >> 15, 1);
        assert_eq!(encoded.data2() >> 15, 0);
    }

    #[test]
    fn test_dropped_index_bits_for_x_largest() {
        // A near-half-turn about X makes x the dominant component (index 0).
        let q = Quaternion::from_axis_angle(Vec4::UNIT_X, 3.0);
        let encoded = EncodedQuaternion::encode(q);
        assert_eq!(encoded.data0() >> 15, 0);
        assert_eq!(encoded.data1() >> 15, 0);
        assert!(encoded.decode().angular_distance(q) < ROUNDTRIP_BOUND);
    }

    #[test]
    fn test_dropped_index_bits_for_y_and_z_largest() {
        let qy = Quaternion::from_axis_angle(Vec4::UNIT_Y, 3.0);
        let ey = EncodedQuaternion::encode(qy);
        assert_eq!((ey.data0() >> 15, ey.data1() >> 15), (0, 1));

        let qz = Quaternion::from_axis_angle(Vec4::UNIT_Z, 3.0);
        let ez = EncodedQuaternion::encode(qz);
        assert_eq!((ez.data0() >> 15, ez.data1() >> 15), (1, 0));
    }

    #[test]
    fn test_tie_resolves_to_earliest_component() {
        // All four components equal: x (index 0) must win.
        let q = Quaternion::from_xyzw(0.5, 0.5, 0.5, 0.5);
        let encoded = EncodedQuaternion::encode(q);
        assert_eq!(encoded.data0() >> 15, 0);
        assert_eq!(encoded.data1() >> 15, 0);
        assert!(encoded.decode().angular_distance(q) < ROUNDTRIP_BOUND);
    }

    #[test]
    fn test_negative_largest_component_same_rotation() {
        // w negative and dominant: survivors are sign-divided, and the
        // decode lands on the other unit-sphere twin of the same rotation.
        let q = -Quaternion::from_euler(0.2, -0.1, 0.3);
        let decoded = EncodedQuaternion::encode(q).decode();
        assert!(decoded.angular_distance(q) < ROUNDTRIP_BOUND);
        let w = decoded.w();
        assert!(w >= 0.0, "dropped component must decode non-negative, got {w}");
    }

    #[test]
    fn test_randomized_roundtrip_bound() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x51_EE7);
        for _ in 0..500 {
            let q = Quaternion::from_xyzw(
                rng.random_range(-1.0f32..1.0),
                rng.random_range(-1.0f32..1.0),
                rng.random_range(-1.0f32..1.0),
                rng.random_range(-1.0f32..1.0),
            );
            if q.length_squared() < 1.0e-3 {
                continue;
            }
            let q = q.normalize();
            let decoded = EncodedQuaternion::encode(q).decode();
            let distance = q.angular_distance(decoded);
            assert!(distance <= ROUNDTRIP_BOUND, "{q:?} drifted {distance} rad");
            assert!(decoded.is_normalized());
        }
    }

    #[test]
    fn test_decoded_rotation_behaves_like_original() {
        let q = Quaternion::from_euler(1.1, -0.4, 0.6);
        let decoded = EncodedQuaternion::encode(q).decode();
        let v = Vec4::new(0.3, 1.0, -2.0, 0.0);
        let original = q.rotate_vector3(v);
        let roundtripped = decoded.rotate_vector3(v);
        assert!(original.is_near_equal(roundtripped, 0.05));
    }

    #[test]
    fn test_words_roundtrip() {
        let encoded = EncodedQuaternion::encode(Quaternion::from_euler(0.5, 0.6, 0.7));
        let rebuilt = EncodedQuaternion::from_words(encoded.words());
        assert_eq!(encoded, rebuilt);
        assert_eq!(
            encoded.words(),
            [encoded.data0(), encoded.data1(), encoded.data2()]
        );
    }

    #[test]
    fn test_wire_size_is_three_words() {
        assert_eq!(std::mem::size_of::<EncodedQuaternion>(), 6);
        let encoded = EncodedQuaternion::encode(Quaternion::IDENTITY);
        assert_eq!(bytemuck::bytes_of(&encoded).len(), 6);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let encoded = EncodedQuaternion::encode(Quaternion::from_euler(-0.3, 0.9, 0.1));
        let bytes = rmp_serde::to_vec(&encoded).unwrap();
        let restored: EncodedQuaternion = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(encoded, restored);
    }
}

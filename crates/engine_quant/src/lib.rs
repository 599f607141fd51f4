//! # engine_quant
//!
//! Bit-packing quantisation codecs sitting on top of
//! [`engine_math`](engine_math). The resource pipeline bakes values through
//! the encoders once and the runtime decodes them many times, so decoders
//! stay allocation-free and branch-light.
//!
//! This crate provides:
//!
//! - [`normalized`] — const-generic N-bit codecs for floats in `[0, 1]` /
//!   `[-1, 1]`, plus a 16-bit arbitrary-range remap.
//! - [`quaternion`] — [`EncodedQuaternion`], the 48-bit
//!   largest-component-dropped rotation codec.

pub mod normalized;
pub mod quaternion;

pub use normalized::{
    decode_range, decode_snorm, decode_unorm, encode_range, encode_snorm, encode_unorm,
};
pub use quaternion::EncodedQuaternion;

//! # engine_math
//!
//! Hand-written 3D math core for the engine. These types sit on every hot
//! per-frame path — transform composition, skinning, camera math, gizmo
//! manipulation — so they are plain value types: no allocation, no shared
//! state, safe to use from any thread.
//!
//! This crate provides:
//!
//! - [`Vec4`] — aligned 4-lane float vector, the storage primitive for
//!   everything else (plus [`Mask4`] for branchless blends).
//! - [`Quaternion`] — unit-by-convention rotation built on [`Vec4`], with
//!   NLERP/SLERP/SQUAD interpolation.
//! - [`Matrix4x4`] — four [`Vec4`] rows forming a row-major affine
//!   transform, with scale/shear/rotation decomposition.
//! - [`contract_assert!`] — debug-only caller-contract checks.
//!
//! Single precision only; wire layouts are little-endian IEEE-754 floats as
//! documented on each type's `to_bytes`.

pub mod contract;
pub mod matrix;
pub mod quaternion;
pub mod scalar;
pub mod vec4;

pub use matrix::{DecomposeError, Decomposition, Matrix4x4};
pub use quaternion::Quaternion;
pub use vec4::{Mask4, Vec4};

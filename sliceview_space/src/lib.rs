// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sliceview Space: 3D affine transforms and cutting-plane geometry.
//!
//! This crate provides the small amount of 3D math the slice-view stack is
//! built on:
//!
//! - [`Affine3`]: a 4x4 affine transform carrying its own cached inverse,
//!   with point/vector application and composition.
//! - Plane helpers: parallelism tests, the closed-form three-plane
//!   intersection used to place cross-view navigation handles, and
//!   point-to-segment distance for picking those handles.
//!
//! It owns no view or window state. Higher-level crates compose these
//! primitives into per-view transform pipelines.
//!
//! ## Minimal example
//!
//! ```rust
//! use nalgebra::{Point3, Vector3};
//! use sliceview_space::Affine3;
//!
//! // Quarter turn about the Z axis, anchored at the origin.
//! let rot = Affine3::rotation_about(
//!     Point3::origin(),
//!     Vector3::z(),
//!     std::f64::consts::FRAC_PI_2,
//! );
//!
//! let p = rot.transform_point(&Point3::new(1.0, 0.0, 0.0));
//! assert!((p.y - 1.0).abs() < 1e-12);
//!
//! // The inverse is already cached; round-tripping is exact up to
//! // floating error.
//! let back = rot.inverse_transform_point(&p);
//! assert!((back.x - 1.0).abs() < 1e-12);
//! ```

mod affine;
mod plane;

pub use affine::Affine3;
pub use plane::{
    PARALLEL_EPSILON, distance_to_segment, three_plane_intersection, vectors_parallel,
};

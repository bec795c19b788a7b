// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sliceview View: per-view slice state and coordinate conversion.
//!
//! A slice view is a 2D window onto a shared 3D world: it slices the world
//! along a (possibly tilted) cutting plane and shows the result at some
//! zoom around a world-space center. This crate provides the headless model
//! of one such view:
//!
//! - [`Axis`] and [`ViewState`]: the slice parameters, with the invariants
//!   (unit normal, zoom floor) enforced by the setters.
//! - [`TransformPipeline`]: derives View↔Window from the plane orientation,
//!   composes it with an externally owned World↔View transform, and
//!   converts between window pixels and world coordinates.
//! - [`Segment`] and [`intersection_segment`]: where another view's cutting
//!   plane crosses this view's visible window, used to draw and drag
//!   navigation handles.
//!
//! It does **not** own sibling views, linking, or any shared state; those
//! live in higher-level crates.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Point;
//! use nalgebra::Point3;
//! use sliceview_space::Affine3;
//! use sliceview_view::{Axis, TransformPipeline, ViewState};
//!
//! let mut state = ViewState::new(Axis::Z);
//! state.set_buffer_size(256, 256);
//!
//! let mut pipeline = TransformPipeline::new();
//! pipeline.rebuild(&state, &Affine3::identity());
//!
//! // The window center maps onto the view center.
//! let world = pipeline.window_to_world(&state, Point::new(128.0, 128.0));
//! assert_eq!(world, Point3::new(0.0, 0.0, 0.0));
//! ```

mod intersect;
mod pipeline;
mod state;

pub use intersect::{Segment, intersection_segment};
pub use pipeline::TransformPipeline;
pub use state::{Axis, MIN_ZOOM, ViewState};

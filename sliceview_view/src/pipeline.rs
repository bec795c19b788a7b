// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use nalgebra::{Point3, Vector3};
use sliceview_space::Affine3;

use crate::state::{Axis, ViewState};

/// Derived coordinate transforms for one view.
///
/// The pipeline owns the two transforms a view derives from its state:
/// View↔Window (the in-plane rotation lining the cutting plane up with the
/// window) and World↔Window (that rotation composed with the inverse of
/// the externally owned World↔View transform). Pixel scaling and the
/// zoom/center offsets are deliberately *not* baked into the matrices:
/// keeping the pixel math axis-aligned and pushing all orientation through
/// one transform keeps the conversion formulas identical no matter how
/// complicated the external transform is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformPipeline {
    view_to_window: Affine3,
    world_to_window: Affine3,
}

impl TransformPipeline {
    /// Creates a pipeline with identity transforms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes both derived transforms from the view state and the
    /// external World↔View transform.
    ///
    /// View↔Window is the rotation about `normal × canonical_axis`,
    /// anchored at the view center, by the angle between the two. For the
    /// X axis the angle is negated; the asymmetry relative to Y/Z is
    /// longstanding behavior and is preserved as-is.
    pub fn rebuild(&mut self, state: &ViewState, world_to_view: &Affine3) {
        let normal = state.plane_normal();
        let canonical = state.in_plane().unit_normal();

        let mut radians = normal.angle(&canonical);
        if state.in_plane() == Axis::X {
            radians = -radians;
        }

        let axis = normal.cross(&canonical);
        self.view_to_window = Affine3::rotation_about(state.center(), axis, radians);
        self.rebuild_world_to_window(world_to_view);
    }

    /// Recomposes World↔Window only, for when the external World↔View
    /// transform changed but the view state did not.
    pub fn rebuild_world_to_window(&mut self, world_to_view: &Affine3) {
        self.world_to_window = self.view_to_window * world_to_view.inverse();
    }

    /// The derived View↔Window transform.
    #[must_use]
    pub fn view_to_window(&self) -> &Affine3 {
        &self.view_to_window
    }

    /// The derived World↔Window transform.
    #[must_use]
    pub fn world_to_window(&self) -> &Affine3 {
        &self.world_to_window
    }

    /// Converts a window pixel into world coordinates.
    ///
    /// The two in-plane coordinates are `((pixel − dim/2) / zoom) +
    /// center`, the out-of-plane coordinate sits on the cutting plane at
    /// `center[axis]`; the window x is mirrored first when the flip flag
    /// applies. The resulting window-space triple is pushed through the
    /// inverse of World↔Window.
    #[must_use]
    pub fn window_to_world(&self, state: &ViewState, window: Point) -> Point3<f64> {
        let width = f64::from(state.buffer_width());
        let height = f64::from(state.buffer_height());
        let center = state.center();

        let mut x = window.x;
        if state.mirrors_x() {
            x = width - x;
        }

        let to_world = |pixel: f64, center: f64, dim: f64| {
            (pixel - dim / 2.0) / state.zoom() + center
        };

        let window_space = match state.in_plane() {
            Axis::X => Point3::new(
                center.x,
                to_world(x, center.y, width),
                to_world(window.y, center.z, height),
            ),
            Axis::Y => Point3::new(
                to_world(x, center.x, width),
                center.y,
                to_world(window.y, center.z, height),
            ),
            Axis::Z => Point3::new(
                to_world(x, center.x, width),
                to_world(window.y, center.y, height),
                center.z,
            ),
        };

        self.world_to_window.inverse_transform_point(&window_space)
    }

    /// Converts a world point into the nearest window pixel.
    #[must_use]
    pub fn world_to_window_pixel(&self, state: &ViewState, world: &Point3<f64>) -> (i32, i32) {
        let width = f64::from(state.buffer_width());
        let height = f64::from(state.buffer_height());
        let center = state.center();

        let window_space = self.world_to_window.transform_point(world);

        let to_window =
            |value: f64, center: f64, dim: f64| (value - center) * state.zoom() + dim / 2.0;

        let (mut x, y) = match state.in_plane() {
            Axis::X => (
                to_window(window_space.y, center.y, width),
                to_window(window_space.z, center.z, height),
            ),
            Axis::Y => (
                to_window(window_space.x, center.x, width),
                to_window(window_space.z, center.z, height),
            ),
            Axis::Z => (
                to_window(window_space.x, center.x, width),
                to_window(window_space.y, center.y, height),
            ),
        };
        if state.mirrors_x() {
            x = width - x;
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "pixel coordinates are far below i32 range"
        )]
        let pixel = (x.round() as i32, y.round() as i32);
        pixel
    }

    /// Moves a world point by a window-space delta.
    ///
    /// The point goes through View↔Window, the delta is added there, and
    /// the sum comes back through the inverse. This is what makes panning
    /// feel screen-relative under any plane rotation.
    #[must_use]
    pub fn translate_in_window_space(
        &self,
        world: &Point3<f64>,
        delta: &Vector3<f64>,
    ) -> Point3<f64> {
        let window = self.view_to_window.transform_point(world);
        self.view_to_window.inverse_transform_point(&(window + delta))
    }
}

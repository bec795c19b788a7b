// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use nalgebra::{Point3, Vector3};

/// Smallest permitted zoom factor. Every zoom mutation clamps to this.
pub const MIN_ZOOM: f64 = 0.25;

/// Length below which a requested normal is rejected as zero.
const ZERO_EPSILON: f64 = 1e-12;

/// Smallest magnitude the normal's component along the principal axis may
/// have: the cutting plane may not skew past roughly 60° from its
/// canonical orientation.
const MIN_PRINCIPAL_COMPONENT: f64 = 0.5;

/// The orthogonal slicing direction of a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Axis {
    /// Slice along world X.
    X,
    /// Slice along world Y.
    Y,
    /// Slice along world Z.
    #[default]
    Z,
}

impl Axis {
    /// The canonical unit normal for this axis.
    #[must_use]
    pub fn unit_normal(self) -> Vector3<f64> {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }

    /// The coordinate index (0, 1, or 2) this axis selects.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// The slice parameters of a single view.
///
/// All mutation goes through the setters, which maintain the invariants:
/// the stored normal is always unit length, its component along the
/// principal axis never drops below 0.5 in magnitude, and the zoom factor
/// never drops below [`MIN_ZOOM`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    in_plane: Axis,
    plane_normal: Vector3<f64>,
    center: Point3<f64>,
    zoom: f64,
    buffer_width: u32,
    buffer_height: u32,
    flip_left_right: bool,
}

impl ViewState {
    /// Creates a view slicing along `in_plane` with the canonical normal,
    /// centered on the world origin at zoom 1, with an empty buffer.
    #[must_use]
    pub fn new(in_plane: Axis) -> Self {
        Self {
            in_plane,
            plane_normal: in_plane.unit_normal(),
            center: Point3::origin(),
            zoom: 1.0,
            buffer_width: 0,
            buffer_height: 0,
            flip_left_right: false,
        }
    }

    /// The principal slicing axis.
    #[must_use]
    pub fn in_plane(&self) -> Axis {
        self.in_plane
    }

    /// The unit normal of the cutting plane.
    #[must_use]
    pub fn plane_normal(&self) -> Vector3<f64> {
        self.plane_normal
    }

    /// The world-space center of the view.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// The current zoom factor (world units per pixel is `1 / zoom`).
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Frame buffer width in pixels.
    #[must_use]
    pub fn buffer_width(&self) -> u32 {
        self.buffer_width
    }

    /// Frame buffer height in pixels.
    #[must_use]
    pub fn buffer_height(&self) -> u32 {
        self.buffer_height
    }

    /// Whether left and right are mirrored for Y/Z views.
    #[must_use]
    pub fn flip_left_right(&self) -> bool {
        self.flip_left_right
    }

    /// Whether the window x coordinate is actually mirrored: the flip flag
    /// only applies when slicing along Y or Z.
    #[must_use]
    pub fn mirrors_x(&self) -> bool {
        self.flip_left_right && self.in_plane != Axis::X
    }

    /// Sets the world-space center.
    pub fn set_center(&mut self, center: Point3<f64>) {
        self.center = center;
    }

    /// Sets the zoom factor, clamping to [`MIN_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        // f64::max ignores NaN, so even a NaN request lands on the floor.
        self.zoom = zoom.max(MIN_ZOOM);
    }

    /// Sets the principal axis. Switching to a different axis resets the
    /// plane normal to that axis's canonical orientation.
    pub fn set_in_plane(&mut self, in_plane: Axis) {
        if self.in_plane != in_plane {
            self.plane_normal = in_plane.unit_normal();
        }
        self.in_plane = in_plane;
    }

    /// Sets the cutting-plane normal.
    ///
    /// The input is normalized before being stored. Returns `false` (and
    /// keeps the previous normal) when the input is zero-length or when
    /// the normalized component along the principal axis has magnitude
    /// below 0.5.
    pub fn set_plane_normal(&mut self, normal: Vector3<f64>) -> bool {
        let Some(normal) = normal.try_normalize(ZERO_EPSILON) else {
            return false;
        };
        if normal[self.in_plane.index()].abs() < MIN_PRINCIPAL_COMPONENT {
            return false;
        }
        self.plane_normal = normal;
        true
    }

    /// Resets the normal to the canonical orientation for the principal
    /// axis, cancelling any skew.
    pub fn reset_plane_normal(&mut self) {
        self.plane_normal = self.in_plane.unit_normal();
    }

    /// Sets the frame buffer dimensions in pixels.
    pub fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.buffer_width = width;
        self.buffer_height = height;
    }

    /// Sets the left-right flip flag (honored only for Y/Z views).
    pub fn set_flip_left_right(&mut self, flip: bool) {
        self.flip_left_right = flip;
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Axis::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zoom_is_clamped_on_every_mutation() {
        let mut state = ViewState::new(Axis::Z);
        state.set_zoom(8.0);
        assert_eq!(state.zoom(), 8.0);
        state.set_zoom(0.15);
        assert_eq!(state.zoom(), MIN_ZOOM);
        state.set_zoom(-3.0);
        assert_eq!(state.zoom(), MIN_ZOOM);
        state.set_zoom(f64::NAN);
        assert_eq!(state.zoom(), MIN_ZOOM);
    }

    #[test]
    fn normal_is_unit_length_after_set() {
        let mut state = ViewState::new(Axis::Z);
        assert!(state.set_plane_normal(Vector3::new(0.2, 0.2, 3.0)));
        assert_relative_eq!(state.plane_normal().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn normal_rejects_zero_and_skewed_inputs() {
        let mut state = ViewState::new(Axis::Z);
        let before = state.plane_normal();

        assert!(!state.set_plane_normal(Vector3::zeros()));
        assert_eq!(state.plane_normal(), before);

        // Dominant component along X, not Z: more than 60° of skew.
        assert!(!state.set_plane_normal(Vector3::new(1.0, 0.0, 0.2)));
        assert_eq!(state.plane_normal(), before);
    }

    #[test]
    fn switching_axis_resets_normal() {
        let mut state = ViewState::new(Axis::Z);
        assert!(state.set_plane_normal(Vector3::new(0.3, 0.0, 1.0)));
        state.set_in_plane(Axis::X);
        assert_eq!(state.plane_normal(), Vector3::x());

        // Setting the same axis again leaves a tilted normal alone.
        assert!(state.set_plane_normal(Vector3::new(1.0, 0.3, 0.0)));
        let tilted = state.plane_normal();
        state.set_in_plane(Axis::X);
        assert_eq!(state.plane_normal(), tilted);
    }

    #[test]
    fn reset_plane_normal_restores_canonical() {
        let mut state = ViewState::new(Axis::Y);
        assert!(state.set_plane_normal(Vector3::new(0.3, 1.0, 0.3)));
        state.reset_plane_normal();
        assert_eq!(state.plane_normal(), Vector3::y());
    }

    #[test]
    fn flip_only_mirrors_y_and_z() {
        let mut state = ViewState::new(Axis::X);
        state.set_flip_left_right(true);
        assert!(!state.mirrors_x());
        state.set_in_plane(Axis::Y);
        assert!(state.mirrors_x());
        state.set_in_plane(Axis::Z);
        assert!(state.mirrors_x());
    }
}

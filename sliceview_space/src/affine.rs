// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Unit, Vector3};

/// Axis length below which a rotation axis is treated as degenerate.
const AXIS_EPSILON: f64 = 1e-12;

/// A 4x4 affine transform with a cached inverse.
///
/// Keeping the inverse alongside the forward matrix means that callers
/// which bounce points back and forth between spaces (window ↔ world, every
/// pointer event) never recompute a matrix inverse on the hot path. The two
/// matrices are only ever built together, so they cannot drift apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine3 {
    forward: Matrix4<f64>,
    inverse: Matrix4<f64>,
}

impl Affine3 {
    /// Returns the identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            forward: Matrix4::identity(),
            inverse: Matrix4::identity(),
        }
    }

    /// Builds a transform from an arbitrary affine matrix.
    ///
    /// Returns `None` when the matrix is singular; callers are expected to
    /// keep whatever transform they had before.
    #[must_use]
    pub fn from_matrix(forward: Matrix4<f64>) -> Option<Self> {
        let inverse = forward.try_inverse()?;
        Some(Self { forward, inverse })
    }

    /// Builds a rotation about an arbitrary `axis` anchored at `center`.
    ///
    /// The axis does not need to be normalized. A near-zero axis or a zero
    /// angle yields the identity, which is the common case of a cutting
    /// plane sitting exactly on its canonical orientation.
    #[must_use]
    pub fn rotation_about(center: Point3<f64>, axis: Vector3<f64>, radians: f64) -> Self {
        let Some(axis) = Unit::try_new(axis, AXIS_EPSILON) else {
            return Self::identity();
        };
        if radians == 0.0 {
            return Self::identity();
        }

        let to_center = Translation3::from(center.coords).to_homogeneous();
        let from_center = Translation3::from(-center.coords).to_homogeneous();
        let rotation = Rotation3::from_axis_angle(&axis, radians).to_homogeneous();
        // Rotating by the negated angle gives an exact inverse without a
        // numeric matrix inversion.
        let rotation_inv = Rotation3::from_axis_angle(&axis, -radians).to_homogeneous();

        Self {
            forward: to_center * rotation * from_center,
            inverse: to_center * rotation_inv * from_center,
        }
    }

    /// Applies the forward transform to a point.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.forward.transform_point(point)
    }

    /// Applies the inverse transform to a point.
    #[must_use]
    pub fn inverse_transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.inverse.transform_point(point)
    }

    /// Applies the forward transform to a direction vector (no translation).
    #[must_use]
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.forward.transform_vector(vector)
    }

    /// Returns the transform mapping the other way.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            forward: self.inverse,
            inverse: self.forward,
        }
    }

    /// Returns the forward matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.forward
    }
}

impl Default for Affine3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl core::ops::Mul for Affine3 {
    type Output = Self;

    /// Composes two transforms: `(a * b)` applies `b` first, then `a`.
    fn mul(self, rhs: Self) -> Self {
        Self {
            forward: self.forward * rhs.forward,
            inverse: rhs.inverse * self.inverse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_round_trip() {
        let t = Affine3::identity();
        let p = Point3::new(3.0, -2.0, 7.5);
        assert_eq!(t.transform_point(&p), p);
        assert_eq!(t.inverse_transform_point(&p), p);
    }

    #[test]
    fn from_matrix_rejects_singular() {
        let mut m = Matrix4::identity();
        m[(0, 0)] = 0.0;
        assert!(Affine3::from_matrix(m).is_none());
    }

    #[test]
    fn rotation_about_anchor_keeps_anchor_fixed() {
        let center = Point3::new(10.0, 20.0, 30.0);
        let t = Affine3::rotation_about(center, Vector3::z(), 1.1);
        let moved = t.transform_point(&center);
        assert_relative_eq!(moved, center, epsilon = 1e-12);
    }

    #[test]
    fn rotation_inverse_is_exact_round_trip() {
        let t = Affine3::rotation_about(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 0.0), 0.7);
        let p = Point3::new(-4.0, 5.0, 0.25);
        let back = t.inverse_transform_point(&t.transform_point(&p));
        assert_relative_eq!(back, p, epsilon = 1e-10);
    }

    #[test]
    fn degenerate_axis_yields_identity() {
        let t = Affine3::rotation_about(Point3::origin(), Vector3::zeros(), 1.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(&p), p);
    }

    #[test]
    fn composition_applies_right_then_left() {
        let translate =
            Affine3::from_matrix(Translation3::new(5.0, 0.0, 0.0).to_homogeneous()).unwrap();
        let rotate = Affine3::rotation_about(
            Point3::origin(),
            Vector3::z(),
            std::f64::consts::FRAC_PI_2,
        );

        // rotate ∘ translate: (1,0,0) → (6,0,0) → (0,6,0).
        let composed = rotate * translate;
        let p = composed.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 6.0, 0.0), epsilon = 1e-12);

        // The composed inverse must round-trip too.
        let back = composed.inverse_transform_point(&p);
        assert_relative_eq!(back, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn transform_vector_ignores_translation() {
        let translate =
            Affine3::from_matrix(Translation3::new(5.0, 6.0, 7.0).to_homogeneous()).unwrap();
        let v = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(translate.transform_vector(&v), v);
    }
}

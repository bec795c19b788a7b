// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use nalgebra::{Point3, Vector3};

/// Tolerance used by [`vectors_parallel`]: two unit vectors whose dot
/// product is within this distance of ±1 count as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-5;

/// Length below which a vector is considered zero.
const ZERO_EPSILON: f64 = 1e-12;

/// Returns `true` when `a` and `b` point along the same line, in either
/// direction.
///
/// Zero-length inputs are never parallel to anything.
#[must_use]
pub fn vectors_parallel(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    let (Some(a), Some(b)) = (a.try_normalize(ZERO_EPSILON), b.try_normalize(ZERO_EPSILON)) else {
        return false;
    };
    1.0 - a.dot(&b).abs() < PARALLEL_EPSILON
}

/// Solves for the single point shared by three planes.
///
/// Each plane is given as a point on it (`p*`) and its normal (`n*`):
///
/// ```text
/// P = [ (p1·n1)(n2×n3) + (p2·n2)(n3×n1) + (p3·n3)(n1×n2) ] / (n1 · (n2×n3))
/// ```
///
/// Returns `None` when the planes share no single point: the denominator
/// is the scalar triple product of the normals, which vanishes not only
/// for pairwise-parallel normals but whenever the three are coplanar (the
/// intersection line of two planes running parallel to the third).
#[must_use]
pub fn three_plane_intersection(
    p1: &Point3<f64>,
    n1: &Vector3<f64>,
    p2: &Point3<f64>,
    n2: &Vector3<f64>,
    p3: &Point3<f64>,
    n3: &Vector3<f64>,
) -> Option<Point3<f64>> {
    let denominator = n1.dot(&n2.cross(n3));
    if denominator.abs() < ZERO_EPSILON {
        return None;
    }
    let numerator = p1.coords.dot(n1) * n2.cross(n3)
        + p2.coords.dot(n2) * n3.cross(n1)
        + p3.coords.dot(n3) * n1.cross(n2);
    Some(Point3::from(numerator / denominator))
}

/// Perpendicular distance from `point` to the segment `a`–`b`.
///
/// The projection is clamped to the segment, so points beyond either
/// endpoint measure to that endpoint. A degenerate segment measures to
/// `a`.
#[must_use]
pub fn distance_to_segment(a: &Point3<f64>, b: &Point3<f64>, point: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < ZERO_EPSILON {
        return (point - a).norm();
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (point - closest).norm()
}

// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use nalgebra::{Point3, Vector3};
use sliceview_space::{distance_to_segment, three_plane_intersection, vectors_parallel};

use crate::pipeline::TransformPipeline;
use crate::state::{Axis, ViewState};

/// A world-space segment: where another view's cutting plane crosses this
/// view's visible window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Endpoint anchored at the window's (0, 0) corner plane.
    pub a: Point3<f64>,
    /// Endpoint anchored at the window's (width−1, height−1) corner plane.
    pub b: Point3<f64>,
}

impl Segment {
    /// Perpendicular distance from `point` to this segment.
    #[must_use]
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        distance_to_segment(&self.a, &self.b, point)
    }
}

/// The two synthetic third-plane normals for a view axis.
///
/// The third plane stands in for a window edge: it is perpendicular to the
/// view's principal axis. When the first candidate happens to be parallel
/// to the other view's plane, the alternate orientation is guaranteed not
/// to be.
fn side_plane_normals(axis: Axis) -> (Vector3<f64>, Vector3<f64>) {
    match axis {
        Axis::X => (Vector3::y(), Vector3::z()),
        Axis::Y => (Vector3::x(), Vector3::z()),
        Axis::Z => (Vector3::x(), Vector3::y()),
    }
}

/// Computes the visible segment where another view's cutting plane crosses
/// this view's plane.
///
/// Returns `None` when the two plane normals are parallel, or when either
/// corner solve degenerates (the intersection line running parallel to the
/// side plane); callers keep whatever segment they had cached (a parallel
/// pair has no intersection line to show, and flickering the handle away
/// would help nobody).
#[must_use]
pub fn intersection_segment(
    state: &ViewState,
    pipeline: &TransformPipeline,
    other_normal: &Vector3<f64>,
    other_center: &Point3<f64>,
) -> Option<Segment> {
    let n1 = state.plane_normal();
    let n2 = *other_normal;
    if vectors_parallel(&n1, &n2) {
        return None;
    }

    let p1 = state.center();
    let p2 = *other_center;

    let (mut n3, alternate) = side_plane_normals(state.in_plane());
    if vectors_parallel(&n2, &n3) {
        n3 = alternate;
    }

    // Anchor the third plane at the world points under the two opposite
    // window corners; each anchor pins one endpoint of the visible line.
    let p3 = pipeline.window_to_world(state, Point::new(0.0, 0.0));
    let a = three_plane_intersection(&p1, &n1, &p2, &n2, &p3, &n3)?;

    let far_corner = Point::new(
        f64::from(state.buffer_width()) - 1.0,
        f64::from(state.buffer_height()) - 1.0,
    );
    let p3 = pipeline.window_to_world(state, far_corner);
    let b = three_plane_intersection(&p1, &n1, &p2, &n2, &p3, &n3)?;

    Some(Segment { a, b })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sliceview_space::Affine3;

    fn view(axis: Axis) -> (ViewState, TransformPipeline) {
        let mut state = ViewState::new(axis);
        state.set_buffer_size(256, 256);
        let mut pipeline = TransformPipeline::new();
        pipeline.rebuild(&state, &Affine3::identity());
        (state, pipeline)
    }

    #[test]
    fn z_and_x_planes_intersect_along_the_y_axis() {
        let (state, pipeline) = view(Axis::Z);
        let segment =
            intersection_segment(&state, &pipeline, &Vector3::x(), &Point3::origin()).unwrap();

        for endpoint in [segment.a, segment.b] {
            assert_relative_eq!(endpoint.x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(endpoint.z, 0.0, epsilon = 1e-9);
        }
        assert!(
            (segment.a.y - segment.b.y).abs() > 1.0,
            "endpoints should differ along y"
        );
    }

    #[test]
    fn parallel_planes_yield_none() {
        let (state, pipeline) = view(Axis::Z);
        assert!(
            intersection_segment(&state, &pipeline, &Vector3::z(), &Point3::new(0.0, 0.0, 5.0))
                .is_none()
        );
        assert!(
            intersection_segment(&state, &pipeline, &(-Vector3::z()), &Point3::origin()).is_none()
        );
    }

    #[test]
    fn side_plane_falls_back_when_parallel_to_other() {
        // A Z view against an X-normal plane: the first candidate (x̂) is
        // parallel to the other normal, forcing the alternate (ŷ). The
        // previous test already exercises this; here we pin the Y-view
        // pairing too.
        let (state, pipeline) = view(Axis::Y);
        let segment =
            intersection_segment(&state, &pipeline, &Vector3::x(), &Point3::origin()).unwrap();
        // Intersection of y = 0 and x = 0 runs along z.
        for endpoint in [segment.a, segment.b] {
            assert_relative_eq!(endpoint.x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(endpoint.y, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn offset_other_plane_shifts_the_segment() {
        let (state, pipeline) = view(Axis::Z);
        let segment = intersection_segment(
            &state,
            &pipeline,
            &Vector3::x(),
            &Point3::new(40.0, 0.0, 0.0),
        )
        .unwrap();
        for endpoint in [segment.a, segment.b] {
            assert_relative_eq!(endpoint.x, 40.0, epsilon = 1e-9);
            assert_relative_eq!(endpoint.z, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn degenerate_corner_solve_yields_none_not_infinities() {
        // A plane tilted within xz against a Z view: not parallel to the
        // view plane, but its intersection line runs along y, parallel to
        // the x̂ side plane. The solve must bail instead of caching
        // non-finite endpoints.
        let (state, pipeline) = view(Axis::Z);
        let tilted = Vector3::new(0.6, 0.0, 0.8);
        assert!(intersection_segment(&state, &pipeline, &tilted, &Point3::origin()).is_none());
    }

    #[test]
    fn segment_distance_picks_the_closer_line() {
        let near = Segment {
            a: Point3::new(0.0, -10.0, 0.0),
            b: Point3::new(0.0, 10.0, 0.0),
        };
        let far = Segment {
            a: Point3::new(50.0, -10.0, 0.0),
            b: Point3::new(50.0, 10.0, 0.0),
        };
        let click = Point3::new(2.0, 0.0, 0.0);
        assert!(near.distance_to(&click) < far.distance_to(&click));
    }
}

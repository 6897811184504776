// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment intersection tests
//!
//! 3D: segment against triangles (Möller–Trumbore), quads split into two
//! triangles, and planar faces fanned from their first point.
//! 2D: segment against segment, used for map-plane sightlines.

use crate::point::{orient2d, Point2d, Point3d, EPSILON};

/// Where a segment `a -> b` crosses a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    pub point: Point3d,
    /// Position along the segment, in `[0, 1]`
    pub t: f64,
}

/// Möller–Trumbore intersection of segment `a -> b` with triangle `v0 v1 v2`.
///
/// Both triangle sides count. Segments lying in the triangle plane miss.
pub fn segment_triangle_intersection(
    a: &Point3d,
    b: &Point3d,
    v0: &Point3d,
    v1: &Point3d,
    v2: &Point3d,
) -> Option<SegmentHit> {
    let dir = b - a;
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let h = dir.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = a - v0;
    let u = inv_det * s.dot(&h);
    if !(-EPSILON..=1.0 + EPSILON).contains(&u) {
        return None;
    }
    let q = s.cross(&e1);
    let v = inv_det * dir.dot(&q);
    if v < -EPSILON || u + v > 1.0 + EPSILON {
        return None;
    }
    let t = inv_det * e2.dot(&q);
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(SegmentHit { point: a + dir * t, t })
}

/// Segment against a planar quad given in ring order
pub fn segment_quad_intersection(a: &Point3d, b: &Point3d, quad: &[Point3d; 4]) -> Option<SegmentHit> {
    segment_triangle_intersection(a, b, &quad[0], &quad[1], &quad[2])
        .or_else(|| segment_triangle_intersection(a, b, &quad[0], &quad[2], &quad[3]))
}

/// Segment against a convex planar ring, fanned from its first point
pub fn segment_face_intersection(a: &Point3d, b: &Point3d, ring: &[Point3d]) -> Option<SegmentHit> {
    if ring.len() < 3 {
        return None;
    }
    (1..ring.len() - 1).find_map(|i| segment_triangle_intersection(a, b, &ring[0], &ring[i], &ring[i + 1]))
}

/// Parameters `(t, u)` where segments `p -> q` and `r -> s` cross.
///
/// `t` runs along the first segment, `u` along the second. Parallel
/// segments never cross.
pub fn segment_intersection_2d(p: &Point2d, q: &Point2d, r: &Point2d, s: &Point2d) -> Option<(f64, f64)> {
    let d1 = q - p;
    let d2 = s - r;
    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() < EPSILON {
        return None;
    }
    let w = r - p;
    let t = (w.x * d2.y - w.y * d2.x) / denom;
    let u = (w.x * d1.y - w.y * d1.x) / denom;
    let range = -EPSILON..=1.0 + EPSILON;
    (range.contains(&t) && range.contains(&u)).then_some((t, u))
}

/// True if `p -> q` strictly crosses `r -> s` (endpoints on opposite sides)
pub fn segments_cross_2d(p: &Point2d, q: &Point2d, r: &Point2d, s: &Point2d) -> bool {
    let o1 = orient2d(p, q, r);
    let o2 = orient2d(p, q, s);
    let o3 = orient2d(r, s, p);
    let o4 = orient2d(r, s, q);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall_quad(top: f64) -> [Point3d; 4] {
        [
            Point3d::new(0.0, 0.0, top),
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(100.0, 0.0, 0.0),
            Point3d::new(100.0, 0.0, top),
        ]
    }

    #[test]
    fn test_segment_hits_triangle() {
        let hit = segment_triangle_intersection(
            &Point3d::new(0.2, 0.2, 1.0),
            &Point3d::new(0.2, 0.2, -1.0),
            &Point3d::new(0.0, 0.0, 0.0),
            &Point3d::new(1.0, 0.0, 0.0),
            &Point3d::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(hit.t, 0.5);
        assert_relative_eq!(hit.point.z, 0.0);
    }

    #[test]
    fn test_segment_too_short() {
        let hit = segment_triangle_intersection(
            &Point3d::new(0.2, 0.2, 1.0),
            &Point3d::new(0.2, 0.2, 0.5),
            &Point3d::new(0.0, 0.0, 0.0),
            &Point3d::new(1.0, 0.0, 0.0),
            &Point3d::new(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_segment_quad_both_triangles() {
        let quad = wall_quad(100.0);
        // through the first triangle (near a, low)
        let low = segment_quad_intersection(&Point3d::new(10.0, -10.0, 10.0), &Point3d::new(10.0, 10.0, 10.0), &quad);
        assert!(low.is_some());
        // through the second triangle (near b, high)
        let high = segment_quad_intersection(&Point3d::new(90.0, -10.0, 90.0), &Point3d::new(90.0, 10.0, 90.0), &quad);
        assert_relative_eq!(high.unwrap().t, 0.5);
        // over the top
        let over = segment_quad_intersection(&Point3d::new(50.0, -10.0, 150.0), &Point3d::new(50.0, 10.0, 150.0), &quad);
        assert!(over.is_none());
    }

    #[test]
    fn test_segment_face_fan() {
        let ring = [
            Point3d::new(0.0, 0.0, 5.0),
            Point3d::new(10.0, 0.0, 5.0),
            Point3d::new(12.0, 6.0, 5.0),
            Point3d::new(5.0, 10.0, 5.0),
            Point3d::new(-2.0, 6.0, 5.0),
        ];
        let hit = segment_face_intersection(&Point3d::new(5.0, 8.0, 10.0), &Point3d::new(5.0, 8.0, 0.0), &ring);
        assert_relative_eq!(hit.unwrap().point.z, 5.0);
        assert!(segment_face_intersection(&Point3d::new(20.0, 8.0, 10.0), &Point3d::new(20.0, 8.0, 0.0), &ring).is_none());
    }

    #[test]
    fn test_segment_intersection_2d() {
        let (t, u) = segment_intersection_2d(
            &Point2d::new(0.0, -10.0),
            &Point2d::new(0.0, 10.0),
            &Point2d::new(-5.0, 0.0),
            &Point2d::new(15.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(u, 0.25);
        assert!(segments_cross_2d(
            &Point2d::new(0.0, -10.0),
            &Point2d::new(0.0, 10.0),
            &Point2d::new(-5.0, 0.0),
            &Point2d::new(15.0, 0.0),
        ));
        assert!(segment_intersection_2d(
            &Point2d::new(0.0, 0.0),
            &Point2d::new(1.0, 0.0),
            &Point2d::new(0.0, 1.0),
            &Point2d::new(1.0, 1.0),
        )
        .is_none());
    }
}

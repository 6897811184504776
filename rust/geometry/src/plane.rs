// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Infinite planes with point, line and segment tests

use crate::error::{Error, Result};
use crate::matrix::Matrix4;
use crate::point::{Point2d, Point3d, EPSILON};
use nalgebra::Vector3;

/// Plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Point on the plane
    pub point: Point3d,
    /// Unit normal
    pub normal: Vector3<f64>,
}

/// Where a line meets a plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    pub point: Point3d,
    /// Position along `a -> b`; 0 at `a`, 1 at `b`
    pub t: f64,
}

impl Plane {
    /// Create a plane, normalizing `normal`
    pub fn new(point: Point3d, normal: Vector3<f64>) -> Result<Self> {
        let normal = normal
            .try_normalize(EPSILON)
            .ok_or_else(|| Error::degenerate("plane normal has zero length"))?;
        Ok(Self { point, normal })
    }

    /// Plane through three points; the normal follows `(b - a) x (c - a)`.
    pub fn from_points(a: &Point3d, b: &Point3d, c: &Point3d) -> Result<Self> {
        let normal = (b - a).cross(&(c - a));
        if normal.norm() < EPSILON {
            return Err(Error::degenerate("plane points are collinear"));
        }
        Self::new(*a, normal)
    }

    /// Horizontal plane at elevation `z`, normal up
    pub fn horizontal(z: f64) -> Self {
        Self {
            point: Point3d::new(0.0, 0.0, z),
            normal: Vector3::z(),
        }
    }

    /// Signed distance; positive on the side the normal points to
    #[inline]
    pub fn signed_distance(&self, point: &Point3d) -> f64 {
        (point - self.point).dot(&self.normal)
    }

    /// Check if point is in front of the plane (or on it)
    #[inline]
    pub fn is_front(&self, point: &Point3d) -> bool {
        self.signed_distance(point) >= 0.0
    }

    #[inline]
    pub fn is_point_on_plane(&self, point: &Point3d, epsilon: f64) -> bool {
        self.signed_distance(point).abs() <= epsilon
    }

    /// Two orthonormal vectors spanning the plane, `u x v == normal`
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let n = self.normal;
        // Pick the world axis least aligned with the normal
        let helper = if n.z.abs() < 0.9 { Vector3::z() } else { Vector3::x() };
        let u = helper.cross(&n).normalize();
        let v = n.cross(&u);
        (u, v)
    }

    /// Transform taking world points into plane coordinates:
    /// x/y along the basis, z the signed distance.
    pub fn to_2d_matrix(&self) -> Matrix4 {
        let (u, v) = self.basis();
        let n = self.normal;
        let p = self.point.coords;
        Matrix4::from_rows([
            [u.x, v.x, n.x, 0.0],
            [u.y, v.y, n.y, 0.0],
            [u.z, v.z, n.z, 0.0],
            [-u.dot(&p), -v.dot(&p), -n.dot(&p), 1.0],
        ])
    }

    /// Point in the plane's 2D parameterization (distance off the plane dropped)
    pub fn to_2d(&self, point: &Point3d) -> Point2d {
        let (u, v) = self.basis();
        let d = point - self.point;
        Point2d::new(d.dot(&u), d.dot(&v))
    }

    /// Intersection with the infinite line through `a` and `b`
    pub fn line_intersection(&self, a: &Point3d, b: &Point3d) -> Option<PlaneHit> {
        let dir = b - a;
        let denom = self.normal.dot(&dir);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = (self.point - a).dot(&self.normal) / denom;
        Some(PlaneHit {
            point: a + dir * t,
            t,
        })
    }

    /// Intersection with the segment `a -> b`, endpoints included
    pub fn segment_intersection(&self, a: &Point3d, b: &Point3d) -> Option<PlaneHit> {
        self.line_intersection(a, b)
            .filter(|hit| hit.t >= -EPSILON && hit.t <= 1.0 + EPSILON)
    }

    /// Part of a planar ring on the same side as `keep`, points on the plane
    /// included. Convex rings stay convex.
    pub fn clip_ring(&self, ring: &[Point3d], keep: &Point3d) -> Vec<Point3d> {
        let side = if self.signed_distance(keep) < 0.0 { -1.0 } else { 1.0 };
        let n = ring.len();
        let mut out = Vec::with_capacity(n + 2);
        for i in 0..n {
            let curr = &ring[i];
            let next = &ring[(i + 1) % n];
            let dc = self.signed_distance(curr) * side;
            let dn = self.signed_distance(next) * side;
            if dc >= 0.0 {
                out.push(*curr);
            }
            if (dc > 0.0 && dn < 0.0) || (dc < 0.0 && dn > 0.0) {
                let t = dc / (dc - dn);
                out.push(curr + (next - curr) * t);
            }
        }
        out
    }

    /// True if `a` and `b` lie strictly on opposite sides
    #[inline]
    pub fn separates(&self, a: &Point3d, b: &Point3d) -> bool {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        (da > EPSILON && db < -EPSILON) || (da < -EPSILON && db > EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points_collinear_fails() {
        let a = Point3d::new(0.0, 0.0, 0.0);
        let b = Point3d::new(1.0, 1.0, 1.0);
        let c = Point3d::new(2.0, 2.0, 2.0);
        assert!(matches!(
            Plane::from_points(&a, &b, &c),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_from_points_normal() {
        let plane = Plane::from_points(
            &Point3d::new(0.0, 0.0, 5.0),
            &Point3d::new(1.0, 0.0, 5.0),
            &Point3d::new(0.0, 1.0, 5.0),
        )
        .unwrap();
        assert_relative_eq!(plane.normal.z, 1.0);
        assert_relative_eq!(plane.signed_distance(&Point3d::new(3.0, 3.0, 8.0)), 3.0);
        assert!(plane.is_point_on_plane(&Point3d::new(-4.0, 9.0, 5.0), 1e-9));
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let plane = Plane::new(Point3d::origin(), Vector3::new(1.0, 2.0, 0.5)).unwrap();
        let (u, v) = plane.basis();
        assert_relative_eq!(u.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1e-12);
        assert_relative_eq!((u.cross(&v) - plane.normal).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_to_2d_matrix_matches_to_2d() {
        let plane = Plane::new(Point3d::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 1.0)).unwrap();
        let p = Point3d::new(4.0, -2.0, 7.0);
        let q = plane.to_2d_matrix().transform_point(&p);
        let flat = plane.to_2d(&p);
        assert_relative_eq!(q.x, flat.x, epsilon = 1e-12);
        assert_relative_eq!(q.y, flat.y, epsilon = 1e-12);
        assert_relative_eq!(q.z, plane.signed_distance(&p), epsilon = 1e-12);
    }

    #[test]
    fn test_segment_intersection() {
        let plane = Plane::horizontal(10.0);
        let a = Point3d::new(0.0, 0.0, 0.0);
        let b = Point3d::new(0.0, 20.0, 20.0);
        let hit = plane.segment_intersection(&a, &b).unwrap();
        assert_relative_eq!(hit.t, 0.5);
        assert_relative_eq!(hit.point.y, 10.0);
        assert!(plane.separates(&a, &b));

        let short = Point3d::new(0.0, 5.0, 5.0);
        assert!(plane.segment_intersection(&a, &short).is_none());
        assert!(plane.line_intersection(&a, &short).is_some());

        let flat = Point3d::new(10.0, 0.0, 0.0);
        assert!(plane.line_intersection(&a, &flat).is_none());
    }

    #[test]
    fn test_clip_ring_keeps_reference_side() {
        // vertical quad spanning y 100..200, cut at y = 130
        let plane = Plane::new(Point3d::new(0.0, 130.0, 0.0), Vector3::new(0.0, -1.0, 0.0)).unwrap();
        let quad = [
            Point3d::new(0.0, 100.0, 0.0),
            Point3d::new(0.0, 200.0, 0.0),
            Point3d::new(0.0, 200.0, 50.0),
            Point3d::new(0.0, 100.0, 50.0),
        ];
        let front = plane.clip_ring(&quad, &Point3d::new(50.0, -50.0, 50.0));
        assert_eq!(front.len(), 4);
        assert!(front.iter().all(|p| p.y <= 130.0 + 1e-9));
        assert!(front.iter().any(|p| (p.y - 130.0).abs() < 1e-9));

        let back = plane.clip_ring(&quad, &Point3d::new(50.0, 300.0, 50.0));
        assert_eq!(back.len(), 4);
        assert!(back.iter().all(|p| p.y >= 130.0 - 1e-9));

        // wholly on the far side
        let behind: Vec<_> = quad.iter().map(|p| Point3d::new(p.x, p.y + 100.0, p.z)).collect();
        assert!(plane.clip_ring(&behind, &Point3d::new(50.0, -50.0, 50.0)).is_empty());
    }
}

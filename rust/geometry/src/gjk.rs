// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GJK overlap test and EPA penetration for convex 2D shapes
//!
//! Both work on the Minkowski difference `A - B` through support functions,
//! so any convex shape that can report its furthest point in a direction
//! can take part.

use crate::error::{Error, Result};
use crate::point::{orient2d, Point2d};
use nalgebra::Vector2;
use smallvec::SmallVec;

/// Iteration cap for EPA expansion
pub const EPA_MAX_ITERATIONS: usize = 32;

/// EPA stops once a new support point improves the edge distance by less than this
pub const EPA_TOLERANCE: f64 = 1e-6;

const GJK_MAX_ITERATIONS: usize = 64;

type Vec2 = Vector2<f64>;

/// A convex shape seen through its support function
pub trait Support {
    /// Furthest point of the shape along `direction`
    fn support(&self, direction: &Vec2) -> Point2d;

    /// Any interior point, used to seed the search direction
    fn center(&self) -> Point2d;
}

/// Convex polygon with counter-clockwise vertices
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    points: Vec<Point2d>,
}

impl ConvexPolygon {
    /// Convex hull of the points (Andrew's monotone chain).
    ///
    /// Fails with `DegenerateGeometry` if the hull has fewer than 3 vertices.
    pub fn hull(points: &[Point2d]) -> Result<Self> {
        let mut pts: Vec<Point2d> = points
            .iter()
            .copied()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();
        pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        pts.dedup();
        if pts.len() < 3 {
            return Err(Error::degenerate("hull needs 3 distinct points"));
        }

        let mut hull = half_hull(pts.iter());
        hull.extend(half_hull(pts.iter().rev()));
        if hull.len() < 3 {
            return Err(Error::degenerate("hull points are collinear"));
        }
        Ok(Self { points: hull })
    }

    pub fn points(&self) -> &[Point2d] {
        &self.points
    }
}

/// One monotone chain of the hull, last point dropped
fn half_hull<'a>(points: impl Iterator<Item = &'a Point2d>) -> Vec<Point2d> {
    let mut out: Vec<Point2d> = Vec::new();
    for p in points {
        while out.len() >= 2 && orient2d(&out[out.len() - 2], &out[out.len() - 1], p) <= 0.0 {
            out.pop();
        }
        out.push(*p);
    }
    out.pop();
    out
}

impl Support for ConvexPolygon {
    fn support(&self, direction: &Vec2) -> Point2d {
        let mut best = self.points[0];
        let mut best_dot = best.coords.dot(direction);
        for p in &self.points[1..] {
            let d = p.coords.dot(direction);
            if d > best_dot {
                best = *p;
                best_dot = d;
            }
        }
        best
    }

    fn center(&self) -> Point2d {
        let sum = self.points.iter().fold(Vec2::zeros(), |acc, p| acc + p.coords);
        Point2d::from(sum / self.points.len() as f64)
    }
}

/// Minimum translation separating two overlapping shapes.
///
/// Moving `b` by `normal * depth` (or `a` by the opposite) leaves them touching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub normal: Vec2,
    pub depth: f64,
}

#[inline]
fn minkowski_support<A: Support + ?Sized, B: Support + ?Sized>(a: &A, b: &B, d: &Vec2) -> Vec2 {
    a.support(d) - b.support(&-d)
}

/// `(x × y) × z` restricted to the plane
#[inline]
fn triple(x: &Vec2, y: &Vec2, z: &Vec2) -> Vec2 {
    y * x.dot(z) - x * y.dot(z)
}

#[inline]
fn perp(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

type Simplex = SmallVec<[Vec2; 3]>;

/// Update the simplex toward the origin. Returns true when it encloses it.
fn evolve(simplex: &mut Simplex, d: &mut Vec2) -> bool {
    match simplex.len() {
        2 => {
            let a = simplex[1];
            let b = simplex[0];
            let ab = b - a;
            let ao = -a;
            let mut dir = triple(&ab, &ao, &ab);
            if dir.norm_squared() < f64::EPSILON {
                // origin lies on the segment
                dir = perp(&ab);
            }
            *d = dir;
            false
        }
        3 => {
            let a = simplex[2];
            let b = simplex[1];
            let c = simplex[0];
            let ab = b - a;
            let ac = c - a;
            let ao = -a;
            let ab_perp = triple(&ac, &ab, &ab);
            let ac_perp = triple(&ab, &ac, &ac);
            if ab_perp.dot(&ao) > 0.0 {
                simplex.remove(0);
                *d = ab_perp;
                false
            } else if ac_perp.dot(&ao) > 0.0 {
                simplex.remove(1);
                *d = ac_perp;
                false
            } else {
                true
            }
        }
        _ => false,
    }
}

fn gjk<A: Support + ?Sized, B: Support + ?Sized>(a: &A, b: &B) -> Option<Simplex> {
    let mut d = a.center() - b.center();
    if d.norm_squared() < f64::EPSILON {
        d = Vec2::x();
    }
    let mut simplex: Simplex = SmallVec::new();
    simplex.push(minkowski_support(a, b, &d));
    d = -simplex[0];
    if d.norm_squared() < f64::EPSILON {
        // the first support point is the origin itself
        d = Vec2::x();
    }

    for _ in 0..GJK_MAX_ITERATIONS {
        let p = minkowski_support(a, b, &d);
        if p.dot(&d) <= 0.0 {
            return None;
        }
        simplex.push(p);
        if evolve(&mut simplex, &mut d) {
            return Some(simplex);
        }
    }
    None
}

/// True if the interiors of `a` and `b` overlap
pub fn intersects<A: Support + ?Sized, B: Support + ?Sized>(a: &A, b: &B) -> bool {
    gjk(a, b).is_some()
}

/// Penetration normal and depth of two overlapping shapes, `None` if apart
pub fn penetration<A: Support + ?Sized, B: Support + ?Sized>(a: &A, b: &B) -> Option<Penetration> {
    let simplex = gjk(a, b)?;
    let mut polytope: Vec<Vec2> = simplex.into_iter().collect();
    // wind counter-clockwise so edge normals (e.y, -e.x) point outward
    if orient2d(
        &Point2d::from(polytope[0]),
        &Point2d::from(polytope[1]),
        &Point2d::from(polytope[2]),
    ) < 0.0
    {
        polytope.swap(0, 1);
    }

    let mut best = Penetration {
        normal: Vec2::x(),
        depth: 0.0,
    };
    for _ in 0..EPA_MAX_ITERATIONS {
        let (index, normal, distance) = closest_edge(&polytope)?;
        best = Penetration { normal, depth: distance };
        let p = minkowski_support(a, b, &normal);
        let reach = p.dot(&normal);
        if reach - distance < EPA_TOLERANCE {
            return Some(Penetration { normal, depth: reach });
        }
        polytope.insert(index + 1, p);
    }
    tracing::debug!(depth = best.depth, "EPA hit its iteration cap");
    Some(best)
}

/// Edge of the polytope nearest the origin: (start index, outward normal, distance)
fn closest_edge(polytope: &[Vec2]) -> Option<(usize, Vec2, f64)> {
    let n = polytope.len();
    let mut best: Option<(usize, Vec2, f64)> = None;
    for i in 0..n {
        let a = polytope[i];
        let b = polytope[(i + 1) % n];
        let e = b - a;
        let Some(normal) = Vec2::new(e.y, -e.x).try_normalize(f64::EPSILON) else {
            continue;
        };
        let distance = normal.dot(&a);
        if best.map_or(true, |(_, _, d)| distance < d) {
            best = Some((i, normal, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64) -> ConvexPolygon {
        ConvexPolygon::hull(&[
            Point2d::new(x, y),
            Point2d::new(x + size, y),
            Point2d::new(x + size, y + size),
            Point2d::new(x, y + size),
        ])
        .unwrap()
    }

    #[test]
    fn test_hull_drops_interior_points() {
        let hull = ConvexPolygon::hull(&[
            Point2d::new(0.0, 0.0),
            Point2d::new(4.0, 0.0),
            Point2d::new(2.0, 1.0),
            Point2d::new(4.0, 4.0),
            Point2d::new(0.0, 4.0),
        ])
        .unwrap();
        assert_eq!(hull.points().len(), 4);
        assert!(crate::bool2d::compute_signed_area(hull.points()) > 0.0);
    }

    #[test]
    fn test_hull_collinear_fails() {
        let result = ConvexPolygon::hull(&[Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0), Point2d::new(2.0, 2.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_separated_squares() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(20.0, 0.0, 10.0);
        assert!(!intersects(&a, &b));
        assert!(penetration(&a, &b).is_none());
    }

    #[test]
    fn test_contained_square() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(4.0, 4.0, 2.0);
        assert!(intersects(&a, &b));
        assert!(intersects(&b, &a));
    }

    #[test]
    fn test_penetration_depth() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(9.0, 0.0, 10.0);
        let pen = penetration(&a, &b).unwrap();
        assert_relative_eq!(pen.depth, 1.0, epsilon = 1e-6);
        assert_relative_eq!(pen.normal.x.abs(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(pen.normal.y, 0.0, epsilon = 1e-6);
    }
}

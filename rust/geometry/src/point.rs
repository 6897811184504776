// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point aliases, axis interpolation and bounding boxes
//!
//! Scene space is x/y on the map plane and z for elevation, all in the same
//! unit (map pixels).

use nalgebra::{Point2, Point3, Vector3};

/// A point in scene space
pub type Point3d = Point3<f64>;

/// A point on the map plane or on a projection plane
pub type Point2d = Point2<f64>;

/// Finite stand-in for infinite elevations
pub const MAX_ELEVATION: f64 = 1e6;

/// Tolerance for coordinate comparisons
pub const EPSILON: f64 = 1e-8;

/// Coordinate axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    fn of(self, p: &Point3d) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        }
    }
}

/// Replace infinite elevations with [`MAX_ELEVATION`], keeping the sign.
///
/// NaN passes through so callers can reject it as missing data.
#[inline]
pub fn finite_elevation(z: f64) -> f64 {
    if z.is_infinite() {
        MAX_ELEVATION.copysign(z)
    } else {
        z
    }
}

/// Point on the line through `a` and `b` whose `axis` coordinate equals `value`.
///
/// Returns `None` when the segment is parallel to the axis plane.
pub fn towards_axis(a: &Point3d, b: &Point3d, axis: Axis, value: f64) -> Option<Point3d> {
    let start = axis.of(a);
    let delta = axis.of(b) - start;
    if delta.abs() < EPSILON {
        return None;
    }
    let t = (value - start) / delta;
    let mut p = a + (b - a) * t;
    // Pin the interpolated coordinate exactly on the requested value
    match axis {
        Axis::X => p.x = value,
        Axis::Y => p.y = value,
        Axis::Z => p.z = value,
    }
    Some(p)
}

#[inline]
pub fn towards_x(a: &Point3d, b: &Point3d, x: f64) -> Option<Point3d> {
    towards_axis(a, b, Axis::X, x)
}

#[inline]
pub fn towards_y(a: &Point3d, b: &Point3d, y: f64) -> Option<Point3d> {
    towards_axis(a, b, Axis::Y, y)
}

/// Point on segment `a -> b` at elevation `z` (used for near-plane clipping)
#[inline]
pub fn towards_z(a: &Point3d, b: &Point3d, z: f64) -> Option<Point3d> {
    towards_axis(a, b, Axis::Z, z)
}

/// 2D cross product of `(b - a)` and `(c - a)`. Positive when `c` is left of `a -> b`.
#[inline]
pub fn orient2d(a: &Point2d, b: &Point2d, c: &Point2d) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Check all coordinates of a point are finite
#[inline]
pub fn is_finite_point(p: &Point3d) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// Axis-aligned 3D bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    pub min: Point3d,
    pub max: Point3d,
}

impl Aabb3 {
    /// Create a box from two opposite corners in any order
    pub fn new(a: Point3d, b: Point3d) -> Self {
        Self {
            min: Point3d::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3d::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box around the points, `None` for an empty iterator
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3d>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self { min: first, max: first };
        for p in iter {
            aabb.min.x = aabb.min.x.min(p.x);
            aabb.min.y = aabb.min.y.min(p.y);
            aabb.min.z = aabb.min.z.min(p.z);
            aabb.max.x = aabb.max.x.max(p.x);
            aabb.max.y = aabb.max.y.max(p.y);
            aabb.max.z = aabb.max.z.max(p.z);
        }
        Some(aabb)
    }

    #[inline]
    pub fn center(&self) -> Point3d {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Radius of the bounding sphere centered on [`Aabb3::center`]
    #[inline]
    pub fn radius(&self) -> f64 {
        self.extent().norm() * 0.5
    }

    /// The 8 corners, bottom ring first
    pub fn corners(&self) -> [Point3d; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3d::new(a.x, a.y, a.z),
            Point3d::new(b.x, a.y, a.z),
            Point3d::new(b.x, b.y, a.z),
            Point3d::new(a.x, b.y, a.z),
            Point3d::new(a.x, a.y, b.z),
            Point3d::new(b.x, a.y, b.z),
            Point3d::new(b.x, b.y, b.z),
            Point3d::new(a.x, b.y, b.z),
        ]
    }

    #[inline]
    pub fn contains(&self, p: &Point3d) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

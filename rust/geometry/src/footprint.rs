// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Token footprints on the map plane

use crate::bool2d::{contour_bounds, ensure_ccw, is_valid_contour, point_in_contour, simplify_contour, Region};
use crate::error::{Error, Result};
use crate::point::{orient2d, Point2d, EPSILON};
use std::f64::consts::PI;

/// Segments used to approximate a circular footprint
pub const CIRCLE_SEGMENTS: usize = 16;

/// Shape of a token (or drawing) seen from above
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Circle { center: Point2d, radius: f64 },
    /// Axis-aligned rectangle with its minimum corner at `(x, y)`
    Rectangle { x: f64, y: f64, width: f64, height: f64 },
    Polygon(Vec<Point2d>),
}

impl Footprint {
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Footprint::Rectangle { x, y, width, height }
    }

    pub fn circle(center: Point2d, radius: f64) -> Self {
        Footprint::Circle { center, radius }
    }

    /// Counter-clockwise ring of the footprint.
    ///
    /// Fails with `MissingObstacleData` when the shape has no area or
    /// non-finite coordinates.
    pub fn ring(&self) -> Result<Vec<Point2d>> {
        let ring = match self {
            Footprint::Circle { center, radius } => {
                if !(radius.is_finite() && *radius > EPSILON) {
                    return Err(Error::missing(format!("circle radius {radius}")));
                }
                (0..CIRCLE_SEGMENTS)
                    .map(|i| {
                        let a = 2.0 * PI * i as f64 / CIRCLE_SEGMENTS as f64;
                        Point2d::new(center.x + radius * a.cos(), center.y + radius * a.sin())
                    })
                    .collect()
            }
            Footprint::Rectangle { x, y, width, height } => vec![
                Point2d::new(*x, *y),
                Point2d::new(x + width, *y),
                Point2d::new(x + width, y + height),
                Point2d::new(*x, y + height),
            ],
            Footprint::Polygon(points) => points.clone(),
        };
        if !is_valid_contour(&ring) {
            return Err(Error::missing("footprint has no area or non-finite points"));
        }
        Ok(ensure_ccw(&ring))
    }

    /// Ring clipped to a constraining polygon (walls cutting a token's shape).
    ///
    /// The largest remaining piece is kept.
    pub fn constrained_ring(&self, constraint: Option<&[Point2d]>) -> Result<Vec<Point2d>> {
        let ring = self.ring()?;
        let Some(constraint) = constraint else {
            return Ok(ring);
        };
        let clipped = Region::from_contour(&ring).intersect(&Region::from_contour(constraint));
        clipped
            .outer_contours()
            .map(|c| simplify_contour(&ensure_ccw(&c), 1e-9))
            .max_by(|a, b| {
                crate::bool2d::compute_signed_area(a).total_cmp(&crate::bool2d::compute_signed_area(b))
            })
            .ok_or_else(|| Error::missing("constrained footprint is empty"))
    }

    /// Center of the footprint's bounding box
    pub fn center(&self) -> Point2d {
        match self {
            Footprint::Circle { center, .. } => *center,
            Footprint::Rectangle { x, y, width, height } => Point2d::new(x + width * 0.5, y + height * 0.5),
            Footprint::Polygon(points) => match contour_bounds(points) {
                Some((min, max)) => nalgebra::center(&min, &max),
                None => Point2d::origin(),
            },
        }
    }

    pub fn contains(&self, point: &Point2d) -> bool {
        match self.ring() {
            Ok(ring) => point_in_contour(point, &ring),
            Err(_) => false,
        }
    }
}

/// Indices `i` of edges `ring[i] -> ring[i + 1]` whose outward side faces `viewer`.
///
/// `ring` must be counter-clockwise, so the outward normal of an edge is
/// `(dy, -dx)`.
pub fn viewable_edges(ring: &[Point2d], viewer: &Point2d) -> Vec<usize> {
    let n = ring.len();
    (0..n)
        .filter(|&i| {
            let a = &ring[i];
            let b = &ring[(i + 1) % n];
            // viewer strictly right of a -> b is outside a CCW ring
            orient2d(a, b, viewer) < -EPSILON
        })
        .collect()
}

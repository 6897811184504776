// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-down shadows
//!
//! Walls and tokens cast shadows away from the eye on the map plane. The
//! blocked fraction is the part of the target footprint in shadow. Tiles
//! and drawings cast none.

use super::{Candidate, CoverAlgorithm, CoverQuery, CoverSample};
use crate::category::CoverWarning;
use crate::collision::obstacle_hit;
use crate::error::Result;
use crate::obstacle::ObstacleGeometry;
use token_cover_geometry::gjk::ConvexPolygon;
use token_cover_geometry::ray::segment_intersection_2d;
use token_cover_geometry::{percent_covered, Point2d, Point3d, Region, TokenPrism, WallGeometry};

#[derive(Debug, Clone, Copy, Default)]
pub struct Area2dAlgorithm;

impl CoverAlgorithm for Area2dAlgorithm {
    fn name(&self) -> &'static str {
        "area2d"
    }

    fn compute(&self, query: &CoverQuery<'_>) -> Result<CoverSample> {
        let eye2d = Point2d::new(query.eye.x, query.eye.y);
        let center = query.target.center();
        // Shadows must reach past the far side of the target
        let reach = query
            .target
            .ring()
            .iter()
            .map(|p| (p - eye2d).norm())
            .fold(0.0, f64::max)
            * 2.0
            + 1.0;

        let mut solid = Vec::new();
        let mut terrain = Vec::new();
        for candidate in query.obstacles {
            let Some(shadow) = shadow(candidate, &query.eye, &center, reach) else {
                continue;
            };
            if candidate.is_terrain() {
                terrain.push(shadow);
            } else {
                solid.push(shadow);
            }
        }

        let footprint = Region::from_contour(query.target.ring());
        let coverage = percent_covered(&footprint, &solid, &terrain);
        let mut warnings = Vec::new();
        if coverage.degenerate {
            tracing::warn!("Target footprint has no area");
            warnings.push(CoverWarning::DegenerateTarget);
        }
        Ok(CoverSample {
            percent: coverage.percent,
            warnings,
            views_built: 0,
        })
    }
}

fn shadow(candidate: &Candidate, eye: &Point3d, center: &Point3d, reach: f64) -> Option<Region> {
    let eye2d = Point2d::new(eye.x, eye.y);
    match candidate.geometry.as_ref() {
        ObstacleGeometry::Wall(wall) => {
            crosses_sightline(wall, eye, center).then(|| wall_shadow(wall, &eye2d, reach))
        }
        ObstacleGeometry::Token(prism) => {
            obstacle_hit(eye, center, candidate, &[])?;
            token_shadow(prism, &eye2d, reach)
        }
        ObstacleGeometry::Tile(_) | ObstacleGeometry::Drawing(_) => None,
    }
}

/// The eye-to-center sightline passes through the wall's vertical span
fn crosses_sightline(wall: &WallGeometry, eye: &Point3d, center: &Point3d) -> bool {
    let from = Point2d::new(eye.x, eye.y);
    let to = Point2d::new(center.x, center.y);
    match segment_intersection_2d(&from, &to, &wall.a(), &wall.b()) {
        Some((t, _)) => wall.spans_elevation(eye.z + (center.z - eye.z) * t),
        None => false,
    }
}

fn push_away(p: &Point2d, eye: &Point2d, reach: f64) -> Option<Point2d> {
    (p - eye).try_normalize(f64::EPSILON).map(|dir| p + dir * reach)
}

fn wall_shadow(wall: &WallGeometry, eye: &Point2d, reach: f64) -> Region {
    let (a, b) = (wall.a(), wall.b());
    match (push_away(&a, eye, reach), push_away(&b, eye, reach)) {
        (Some(a2), Some(b2)) => Region::from_contour(&[a, b, b2, a2]),
        _ => Region::empty(),
    }
}

fn token_shadow(prism: &TokenPrism, eye: &Point2d, reach: f64) -> Option<Region> {
    let mut points = prism.ring().to_vec();
    points.extend(prism.ring().iter().filter_map(|p| push_away(p, eye, reach)));
    let hull = ConvexPolygon::hull(&points).ok()?;
    Some(Region::from_contour(hull.points()))
}

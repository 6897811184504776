// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projected area from the attacker's eye
//!
//! The camera sits at the eye, aims at the target center and has its
//! frustum fitted to the target box. Faces that look toward the eye are
//! moved into camera space, truncated at the near cutoff and divided into
//! 2D. Obstacle faces are first cut down to the part in front of the
//! target's visible faces, so nothing behind the target counts. The blocked
//! fraction is the share of the target silhouette covered by obstacle
//! projections.

use super::{holes_at, CoverAlgorithm, CoverQuery, CoverSample};
use crate::category::CoverWarning;
use crate::error::Result;
use token_cover_geometry::{
    percent_covered, Camera, Matrix4, Placeable, PlanePoints, Point3d, ProjectionMode, Region,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Area3dAlgorithm;

impl CoverAlgorithm for Area3dAlgorithm {
    fn name(&self) -> &'static str {
        "area3d"
    }

    fn compute(&self, query: &CoverQuery<'_>) -> Result<CoverSample> {
        let target = query.target;
        let mut camera = Camera::new(query.eye, target.center());
        let view = match camera
            .set_frustum_for_aabb3d(&target.bounds())
            .and_then(|_| camera.look_at_matrix())
        {
            Ok(view) => view,
            Err(err) => {
                tracing::warn!(error = %err, "No view from eye toward target");
                return Ok(CoverSample {
                    percent: 0.0,
                    warnings: vec![CoverWarning::SingularView],
                    views_built: 0,
                });
            }
        };
        let far = camera.projection().far();

        let front = target.faces_toward(&query.eye);
        let silhouette = project(front.iter().copied(), &view, far);
        let mut solid = Vec::new();
        let mut terrain = Vec::new();
        for candidate in query.obstacles {
            let placeable = candidate.geometry.placeable();
            let between = in_front_of(placeable.faces_toward(&query.eye), &front, &query.eye);
            let mut region = project(&between, &view, far);
            if region.is_empty() {
                continue;
            }
            if let Some(z) = candidate.geometry.horizontal_elevation() {
                let holes = holes_at(&candidate.geometry, query.holes, z);
                if !holes.is_empty() {
                    region = region.difference(&project(holes, &view, far));
                }
            }
            if placeable.is_terrain() {
                terrain.push(region);
            } else {
                solid.push(region);
            }
        }

        let coverage = percent_covered(&silhouette, &solid, &terrain);
        let mut warnings = Vec::new();
        if coverage.degenerate {
            tracing::warn!("Target silhouette has no area");
            warnings.push(CoverWarning::DegenerateTarget);
        }
        Ok(CoverSample {
            percent: coverage.percent,
            warnings,
            views_built: 1,
        })
    }
}

/// Pieces of `faces` on the eye's side of at least one visible target face.
///
/// For a convex target, a point inside the view cone hides part of the target
/// exactly when it lies in front of one of those faces' planes.
fn in_front_of(faces: Vec<&PlanePoints>, front: &[&PlanePoints], eye: &Point3d) -> Vec<PlanePoints> {
    let mut out = Vec::new();
    for face in faces {
        out.extend(front.iter().filter_map(|f| face.clipped(f.plane(), eye)));
    }
    out
}

/// Union of the faces' projections; faces wholly past `far` are dropped
fn project<'a>(faces: impl IntoIterator<Item = &'a PlanePoints>, view: &Matrix4, far: f64) -> Region {
    Region::union_all(faces.into_iter().filter_map(|face| {
        let mut face = face.clone();
        face.set_view_matrix(view);
        if face.beyond_far(far) {
            return None;
        }
        Some(Region::from_contour(&face.project(ProjectionMode::default())))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Candidate;
    use crate::obstacle::ObstacleGeometry;
    use slotmap::SlotMap;
    use std::rc::Rc;
    use token_cover_geometry::{Footprint, Point2d, Point3d, TileData, TileGeometry, TokenPrism, WallData, WallGeometry};

    fn target() -> TokenPrism {
        let ring = Footprint::rectangle(30.0, 130.0, 40.0, 40.0).ring().unwrap();
        TokenPrism::build(ring, 0.0, 60.0).unwrap()
    }

    fn run(eye: Point3d, obstacles: Vec<ObstacleGeometry>) -> CoverSample {
        let mut keys: SlotMap<crate::keys::ObstacleId, ()> = SlotMap::with_key();
        let candidates: Vec<Candidate> = obstacles
            .into_iter()
            .map(|g| Candidate {
                id: keys.insert(()),
                geometry: Rc::new(g),
            })
            .collect();
        let target = target();
        let query = CoverQuery {
            eye,
            target: &target,
            obstacles: &candidates,
            holes: &[],
        };
        Area3dAlgorithm.compute(&query).unwrap()
    }

    fn wall(top: f64) -> ObstacleGeometry {
        let data = WallData::new(Point2d::new(0.0, 0.0), Point2d::new(100.0, 0.0)).with_elevation(0.0, top);
        ObstacleGeometry::Wall(WallGeometry::build(&data).unwrap())
    }

    fn eye() -> Point3d {
        Point3d::new(50.0, -50.0, 50.0)
    }

    #[test]
    fn test_open_ground() {
        let sample = run(eye(), Vec::new());
        assert_eq!(sample.percent, 0.0);
        assert_eq!(sample.views_built, 1);
        assert!(sample.warnings.is_empty());
    }

    #[test]
    fn test_wall_partial_and_full() {
        let partial = run(eye(), vec![wall(50.0)]).percent;
        assert!(partial > 0.78 && partial < 0.87, "got {partial}");
        assert_eq!(run(eye(), vec![wall(200.0)]).percent, 1.0);
    }

    #[test]
    fn test_tile_hole_reopens_view() {
        // eye straight above the target, tile in between
        let above = Point3d::new(50.0, 150.0, 200.0);
        let tile = TileData::new(0.0, 100.0, 100.0, 100.0, 100.0);
        let solid = ObstacleGeometry::Tile(TileGeometry::build(&tile).unwrap());
        assert_eq!(run(above, vec![solid]).percent, 1.0);

        // the target shows through x, y in [35.7, 64.3] at the tile's elevation
        let holed = tile.with_hole(vec![
            Point2d::new(30.0, 130.0),
            Point2d::new(70.0, 130.0),
            Point2d::new(70.0, 170.0),
            Point2d::new(30.0, 170.0),
        ]);
        let holed = ObstacleGeometry::Tile(TileGeometry::build(&holed).unwrap());
        assert_eq!(run(above, vec![holed]).percent, 0.0);
    }

    fn wall_at(a: Point2d, b: Point2d) -> ObstacleGeometry {
        let data = WallData::new(a, b).with_elevation(0.0, 100.0);
        ObstacleGeometry::Wall(WallGeometry::build(&data).unwrap())
    }

    fn token_behind() -> ObstacleGeometry {
        let ring = Footprint::rectangle(20.0, 170.0, 60.0, 40.0).ring().unwrap();
        ObstacleGeometry::Token(TokenPrism::build(ring, 0.0, 120.0).unwrap())
    }

    #[test]
    fn test_obstacles_behind_target_give_no_cover() {
        let behind = wall_at(Point2d::new(0.0, 170.2), Point2d::new(100.0, 170.2));
        assert_eq!(run(eye(), vec![behind]).percent, 0.0);
        assert_eq!(run(eye(), vec![token_behind()]).percent, 0.0);

        // seen from above the target's top, the wall rises past its far edge
        let high = Point3d::new(50.0, -50.0, 150.0);
        let behind = wall_at(Point2d::new(0.0, 170.2), Point2d::new(100.0, 170.2));
        assert_eq!(run(high, vec![behind]).percent, 0.0);
    }

    #[test]
    fn test_wall_beside_target_only_counts_its_near_part() {
        // runs past the target's east edge; only y < 130 is in front of it
        let beside = wall_at(Point2d::new(70.3, 100.0), Point2d::new(70.3, 200.0));
        assert_eq!(run(eye(), vec![beside]).percent, 0.0);
    }

    #[test]
    fn test_eye_at_target_center() {
        let sample = run(Point3d::new(50.0, 150.0, 30.0), Vec::new());
        assert_eq!(sample.percent, 0.0);
        assert_eq!(sample.warnings, vec![CoverWarning::SingularView]);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pre-filtering obstacles for one attacker/target pair
//!
//! An obstacle survives when it is not one of the pair, blocks under the
//! token toggles, overlaps the vertical span between eye and target, faces
//! the eye (one-directional walls), and its map-plane box touches the hull
//! of the eye and the target's viewable outline. Horizontal obstacles must also lie
//! strictly between the eye and the nearest part of the target.

use super::Candidate;
use crate::category::CoverWarning;
use crate::config::CoverConfig;
use crate::keys::ObstacleId;
use crate::obstacle::ObstacleGeometry;
use crate::scene::registry::Registry;
use crate::stats::StatsCell;
use token_cover_geometry::gjk::{self, ConvexPolygon};
use token_cover_geometry::point::EPSILON;
use token_cover_geometry::{Aabb3, DrawingRole, Point2d, Point3d, TokenPrism};

/// Slack added around obstacle boxes before the overlap test
const BOX_PADDING: f64 = 0.5;

#[derive(Debug, Default)]
pub(crate) struct Gathered {
    pub obstacles: Vec<Candidate>,
    pub holes: Vec<Candidate>,
    pub warnings: Vec<CoverWarning>,
}

pub(crate) fn gather(
    registry: &Registry,
    config: &CoverConfig,
    stats: &StatsCell,
    exclude: &[ObstacleId],
    eye: &Point3d,
    target: &TokenPrism,
) -> Gathered {
    let eye2d = Point2d::new(eye.x, eye.y);
    let low = eye.z.min(target.bottom());
    let high = eye.z.max(target.top());
    let nearest = target.nearest_elevation(eye.z);
    let (floor_low, floor_high) = (eye.z.min(nearest), eye.z.max(nearest));

    // the hull stops at the target's viewable edges, so obstacles behind it drop out
    let mut points = target.viewable_outline(eye);
    points.push(eye2d);
    let vision = ConvexPolygon::hull(&points).ok();

    let mut out = Gathered::default();
    for (id, obstacle) in registry.iter() {
        if exclude.contains(&id) {
            continue;
        }
        if let Some(token) = obstacle.as_token() {
            if !token.blocks(&config.token_blocking) {
                continue;
            }
        }
        let geometry = match registry.geometry(id, config, stats) {
            Some(Ok(geometry)) => geometry,
            Some(Err(err)) => {
                tracing::warn!(?id, error = %err, "Skipping obstacle");
                out.warnings.push(CoverWarning::SkippedObstacle {
                    id,
                    reason: err.to_string(),
                });
                continue;
            }
            None => continue,
        };

        let bounds = geometry.placeable().bounds();
        if bounds.max.z < low - EPSILON || bounds.min.z > high + EPSILON {
            continue;
        }
        if let ObstacleGeometry::Wall(wall) = geometry.as_ref() {
            if !wall.blocks_from(&eye2d) {
                continue;
            }
        }
        if matches!(geometry.as_ref(), ObstacleGeometry::Drawing(d) if d.role() == DrawingRole::Hole) {
            out.holes.push(Candidate { id, geometry });
            continue;
        }
        if let Some(z) = geometry.horizontal_elevation() {
            if z <= floor_low + EPSILON || z >= floor_high - EPSILON {
                continue;
            }
        }
        if let Some(vision) = &vision {
            if !touches(vision, &bounds) {
                continue;
            }
        }
        out.obstacles.push(Candidate { id, geometry });
    }
    tracing::debug!(
        obstacles = out.obstacles.len(),
        holes = out.holes.len(),
        skipped = out.warnings.len(),
        "Gathered cover candidates"
    );
    out
}

/// GJK overlap of the vision hull with a padded map-plane box
fn touches(vision: &ConvexPolygon, bounds: &Aabb3) -> bool {
    let (x0, y0) = (bounds.min.x - BOX_PADDING, bounds.min.y - BOX_PADDING);
    let (x1, y1) = (bounds.max.x + BOX_PADDING, bounds.max.y + BOX_PADDING);
    match ConvexPolygon::hull(&[
        Point2d::new(x0, y0),
        Point2d::new(x1, y0),
        Point2d::new(x1, y1),
        Point2d::new(x0, y1),
    ]) {
        Ok(footprint) => gjk::intersects(vision, &footprint),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::Obstacle;
    use crate::token::TokenData;
    use token_cover_geometry::{Footprint, TileData, WallData, WallDirection};

    struct Fixture {
        registry: Registry,
        stats: StatsCell,
        config: CoverConfig,
        target: TokenPrism,
    }

    impl Fixture {
        fn new() -> Self {
            let config = CoverConfig::default();
            let target = TokenData::new(Footprint::rectangle(30.0, 130.0, 40.0, 40.0), 0.0, 60.0)
                .prism(&config)
                .unwrap();
            Self {
                registry: Registry::default(),
                stats: StatsCell::default(),
                config,
                target,
            }
        }

        fn gather(&self, eye: Point3d) -> Gathered {
            gather(&self.registry, &self.config, &self.stats, &[], &eye, &self.target)
        }
    }

    fn wall(x0: f64, y0: f64, x1: f64, y1: f64) -> WallData {
        WallData::new(Point2d::new(x0, y0), Point2d::new(x1, y1)).with_elevation(0.0, 100.0)
    }

    #[test]
    fn test_walls_outside_vision_are_dropped() {
        let mut f = Fixture::new();
        let between = f.registry.insert(Obstacle::Wall(wall(0.0, 0.0, 100.0, 0.0)));
        f.registry.insert(Obstacle::Wall(wall(500.0, 0.0, 600.0, 0.0)));
        let got = f.gather(Point3d::new(50.0, -50.0, 50.0));
        let ids: Vec<_> = got.obstacles.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![between]);
    }

    #[test]
    fn test_obstacles_behind_target_are_dropped() {
        let mut f = Fixture::new();
        f.registry.insert(Obstacle::Wall(wall(0.0, 170.2, 100.0, 170.2)));
        f.registry.insert(Obstacle::Token(TokenData::new(
            Footprint::rectangle(20.0, 170.0, 60.0, 40.0),
            0.0,
            120.0,
        )));
        assert!(f.gather(Point3d::new(50.0, -50.0, 50.0)).obstacles.is_empty());
    }

    #[test]
    fn test_one_directional_wall_facing_away() {
        let mut f = Fixture::new();
        // eye at y < 0 is to the right of (0,0) -> (100,0)
        f.registry
            .insert(Obstacle::Wall(wall(0.0, 0.0, 100.0, 0.0).with_direction(WallDirection::Left)));
        assert!(f.gather(Point3d::new(50.0, -50.0, 50.0)).obstacles.is_empty());
    }

    #[test]
    fn test_wall_below_sightlines_is_dropped() {
        let mut f = Fixture::new();
        f.registry.insert(Obstacle::Wall(
            WallData::new(Point2d::new(0.0, 0.0), Point2d::new(100.0, 0.0)).with_elevation(-50.0, -10.0),
        ));
        assert!(f.gather(Point3d::new(50.0, -50.0, 50.0)).obstacles.is_empty());
    }

    #[test]
    fn test_floor_between_levels_only() {
        let mut f = Fixture::new();
        f.registry.insert(Obstacle::Tile(TileData::new(0.0, 0.0, 100.0, 100.0, 80.0)));
        // eye above the target top: the tile sits between eye and target
        assert_eq!(f.gather(Point3d::new(50.0, -50.0, 120.0)).obstacles.len(), 1);
        // eye inside the target's span: nothing horizontal in between
        assert!(f.gather(Point3d::new(50.0, -50.0, 50.0)).obstacles.is_empty());
    }

    #[test]
    fn test_broken_obstacle_becomes_warning() {
        let mut f = Fixture::new();
        let broken = f
            .registry
            .insert(Obstacle::Wall(WallData::new(Point2d::new(10.0, 0.0), Point2d::new(10.0, 0.0))));
        let got = f.gather(Point3d::new(50.0, -50.0, 50.0));
        assert!(got.obstacles.is_empty());
        assert!(matches!(
            got.warnings.as_slice(),
            [CoverWarning::SkippedObstacle { id, .. }] if *id == broken
        ));
    }
}

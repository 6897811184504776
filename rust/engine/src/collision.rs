// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sightline collisions against obstacle faces
//!
//! Walls are tested as quads split into two triangles. Horizontal faces
//! (tiles, floor drawings, prism caps) are cut at their elevation and tested
//! with a point-in-polygon check, so concave drawings work. A hit inside a
//! hole at the same elevation does not count.

use crate::algorithm::{holes_at, Candidate};
use crate::keys::ObstacleId;
use crate::obstacle::ObstacleGeometry;
use smallvec::SmallVec;
use token_cover_geometry::bool2d::point_in_contour;
use token_cover_geometry::point::{towards_z, EPSILON};
use token_cover_geometry::ray::{segment_face_intersection, segment_quad_intersection};
use token_cover_geometry::{DrawingRole, Placeable, PlanePoints, Point2d, Point3d, SegmentHit};

/// Where a sightline meets an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub point: Point3d,
    /// Position along the sightline, in `[0, 1]`
    pub t: f64,
    pub obstacle: ObstacleId,
    /// False for terrain, which needs a second layer to block
    pub blocks_fully: bool,
}

/// What a collision query reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionMode {
    /// Whether the segment is blocked
    #[default]
    Any,
    /// Every hit, nearest first
    All,
    /// Nearest hit, letting the first terrain layer through
    Closest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Collision {
    Any(bool),
    All(Vec<Hit>),
    Closest(Option<Hit>),
}

pub(crate) type Hits = SmallVec<[Hit; 4]>;

/// Blocked by any solid hit or by two terrain layers
pub fn is_blocked(hits: &[Hit]) -> bool {
    let mut terrain = 0;
    for hit in hits {
        if hit.blocks_fully {
            return true;
        }
        terrain += 1;
    }
    terrain >= 2
}

/// Every obstacle the segment `a -> b` passes through
pub(crate) fn segment_hits(a: &Point3d, b: &Point3d, obstacles: &[Candidate], holes: &[Candidate]) -> Hits {
    obstacles
        .iter()
        .filter_map(|c| {
            obstacle_hit(a, b, c, holes).map(|hit| Hit {
                point: hit.point,
                t: hit.t,
                obstacle: c.id,
                blocks_fully: !c.is_terrain(),
            })
        })
        .collect()
}

/// First point where `a -> b` meets one obstacle
pub(crate) fn obstacle_hit(a: &Point3d, b: &Point3d, candidate: &Candidate, holes: &[Candidate]) -> Option<SegmentHit> {
    match candidate.geometry.as_ref() {
        ObstacleGeometry::Wall(wall) => {
            if !wall.blocks_from(&Point2d::new(a.x, a.y)) {
                return None;
            }
            segment_quad_intersection(a, b, &wall.quad())
        }
        ObstacleGeometry::Tile(tile) => {
            let face = tile.faces().first()?;
            let hit = horizontal_hit(a, b, tile.elevation(), face)?;
            (!in_any_hole(&hit.point, &holes_at(&candidate.geometry, holes, tile.elevation()))).then_some(hit)
        }
        ObstacleGeometry::Drawing(drawing) => {
            if drawing.role() == DrawingRole::Hole {
                return None;
            }
            let hit = horizontal_hit(a, b, drawing.elevation(), drawing.face())?;
            (!in_any_hole(&hit.point, &holes_at(&candidate.geometry, holes, drawing.elevation()))).then_some(hit)
        }
        ObstacleGeometry::Token(prism) => {
            let caps = [
                horizontal_hit(a, b, prism.top(), prism.top_face()),
                horizontal_hit(a, b, prism.bottom(), prism.bottom_face()),
            ];
            let sides = prism
                .side_faces()
                .iter()
                .map(|f| segment_face_intersection(a, b, f.points()));
            caps.into_iter()
                .chain(sides)
                .flatten()
                .min_by(|x, y| x.t.total_cmp(&y.t))
        }
    }
}

/// Crossing of `a -> b` with a horizontal face at elevation `z`
fn horizontal_hit(a: &Point3d, b: &Point3d, z: f64, face: &PlanePoints) -> Option<SegmentHit> {
    let dz = b.z - a.z;
    if dz.abs() < EPSILON {
        return None;
    }
    let t = (z - a.z) / dz;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let point = towards_z(a, b, z)?;
    contains_2d(face, &point).then_some(SegmentHit { point, t })
}

fn contains_2d(face: &PlanePoints, point: &Point3d) -> bool {
    let ring: Vec<Point2d> = face.points().iter().map(|p| Point2d::new(p.x, p.y)).collect();
    point_in_contour(&Point2d::new(point.x, point.y), &ring)
}

fn in_any_hole(point: &Point3d, holes: &[&PlanePoints]) -> bool {
    holes.iter().any(|h| contains_2d(h, point))
}

/// Shape a hit list for the requested mode
pub fn resolve(hits: impl IntoIterator<Item = Hit>, mode: CollisionMode) -> Collision {
    let mut hits: Vec<Hit> = hits.into_iter().collect();
    match mode {
        CollisionMode::Any => Collision::Any(is_blocked(&hits)),
        CollisionMode::All => {
            hits.sort_by(|x, y| x.t.total_cmp(&y.t));
            Collision::All(hits)
        }
        CollisionMode::Closest => {
            hits.sort_by(|x, y| x.t.total_cmp(&y.t));
            if let Some(i) = hits.iter().position(|h| !h.blocks_fully) {
                hits.remove(i);
            }
            Collision::Closest(hits.into_iter().next())
        }
    }
}

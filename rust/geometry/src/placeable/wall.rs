// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall geometry - vertical quads between two map points.

use super::Placeable;
use crate::error::{Error, Result};
use crate::face::PlanePoints;
use crate::point::{finite_elevation, orient2d, Point2d, Point3d, EPSILON};
use smallvec::SmallVec;

/// Side(s) of a wall that block sight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallDirection {
    #[default]
    Both,
    /// Blocks viewers left of `a -> b`
    Left,
    /// Blocks viewers right of `a -> b`
    Right,
}

/// Host description of a wall
#[derive(Debug, Clone, PartialEq)]
pub struct WallData {
    pub a: Point2d,
    pub b: Point2d,
    /// Bottom elevation; `-inf` for walls reaching the ground and below
    pub bottom: f64,
    /// Top elevation; `+inf` for walls without a top
    pub top: f64,
    pub direction: WallDirection,
    /// Limited walls only block together with another limited obstacle
    pub terrain: bool,
}

impl WallData {
    /// Full-height, two-sided, non-terrain wall
    pub fn new(a: Point2d, b: Point2d) -> Self {
        Self {
            a,
            b,
            bottom: f64::NEG_INFINITY,
            top: f64::INFINITY,
            direction: WallDirection::Both,
            terrain: false,
        }
    }

    pub fn with_elevation(mut self, bottom: f64, top: f64) -> Self {
        self.bottom = bottom;
        self.top = top;
        self
    }

    pub fn with_direction(mut self, direction: WallDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn terrain(mut self, terrain: bool) -> Self {
        self.terrain = terrain;
        self
    }
}

/// Faces of one wall
#[derive(Debug, Clone)]
pub struct WallGeometry {
    a: Point2d,
    b: Point2d,
    bottom: f64,
    top: f64,
    direction: WallDirection,
    terrain: bool,
    faces: SmallVec<[PlanePoints; 2]>,
}

impl WallGeometry {
    pub fn build(data: &WallData) -> Result<Self> {
        let finite = |p: &Point2d| p.x.is_finite() && p.y.is_finite();
        if !finite(&data.a) || !finite(&data.b) {
            return Err(Error::missing("wall endpoint is not finite"));
        }
        if (data.b - data.a).norm() < EPSILON {
            return Err(Error::missing("wall has zero length"));
        }
        let bottom = finite_elevation(data.bottom);
        let top = finite_elevation(data.top);
        if bottom.is_nan() || top.is_nan() {
            return Err(Error::missing("wall elevation is NaN"));
        }
        if top - bottom < EPSILON {
            return Err(Error::degenerate(format!("wall spans [{bottom}, {top}]")));
        }

        let (a, b) = (data.a, data.b);
        // Ring order makes the normal point to the right of a -> b
        let right = PlanePoints::new([
            Point3d::new(a.x, a.y, top),
            Point3d::new(a.x, a.y, bottom),
            Point3d::new(b.x, b.y, bottom),
            Point3d::new(b.x, b.y, top),
        ])?
        .one_sided(true);

        let mut faces = SmallVec::new();
        match data.direction {
            WallDirection::Right => faces.push(right),
            WallDirection::Left => faces.push(right.reversed()?),
            WallDirection::Both => {
                let left = right.reversed()?;
                faces.push(right);
                faces.push(left);
            }
        }

        Ok(Self {
            a,
            b,
            bottom,
            top,
            direction: data.direction,
            terrain: data.terrain,
            faces,
        })
    }

    #[inline]
    pub fn a(&self) -> Point2d {
        self.a
    }

    #[inline]
    pub fn b(&self) -> Point2d {
        self.b
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    #[inline]
    pub fn direction(&self) -> WallDirection {
        self.direction
    }

    /// Does the wall block sight for a viewer at this map position
    pub fn blocks_from(&self, viewer: &Point2d) -> bool {
        let side = orient2d(&self.a, &self.b, viewer);
        match self.direction {
            WallDirection::Both => true,
            WallDirection::Left => side > EPSILON,
            WallDirection::Right => side < -EPSILON,
        }
    }

    /// Vertical span contains `z`
    #[inline]
    pub fn spans_elevation(&self, z: f64) -> bool {
        z >= self.bottom - EPSILON && z <= self.top + EPSILON
    }

    /// The quad used for segment tests (the first face)
    pub fn quad(&self) -> [Point3d; 4] {
        let (a, b) = (self.a, self.b);
        [
            Point3d::new(a.x, a.y, self.top),
            Point3d::new(a.x, a.y, self.bottom),
            Point3d::new(b.x, b.y, self.bottom),
            Point3d::new(b.x, b.y, self.top),
        ]
    }
}

impl Placeable for WallGeometry {
    fn faces(&self) -> &[PlanePoints] {
        &self.faces
    }

    fn is_terrain(&self) -> bool {
        self.terrain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::MAX_ELEVATION;

    fn wall() -> WallData {
        WallData::new(Point2d::new(0.0, 0.0), Point2d::new(100.0, 0.0))
    }

    #[test]
    fn test_infinite_elevation_is_clamped() {
        let geom = WallGeometry::build(&wall()).unwrap();
        assert_eq!(geom.top(), MAX_ELEVATION);
        assert_eq!(geom.bottom(), -MAX_ELEVATION);
        assert_eq!(geom.faces().len(), 2);
    }

    #[test]
    fn test_zero_length_wall_is_missing_data() {
        let data = WallData::new(Point2d::new(5.0, 5.0), Point2d::new(5.0, 5.0));
        assert!(matches!(WallGeometry::build(&data), Err(Error::MissingObstacleData(_))));
        let data = WallData::new(Point2d::new(f64::NAN, 5.0), Point2d::new(5.0, 5.0));
        assert!(matches!(WallGeometry::build(&data), Err(Error::MissingObstacleData(_))));
    }

    #[test]
    fn test_both_sided_wall_shows_one_face() {
        let geom = WallGeometry::build(&wall().with_elevation(0.0, 100.0)).unwrap();
        let south = Point3d::new(50.0, -50.0, 50.0);
        let north = Point3d::new(50.0, 50.0, 50.0);
        assert_eq!(geom.faces_toward(&south).len(), 1);
        assert_eq!(geom.faces_toward(&north).len(), 1);
        assert!(geom.faces_toward(&south)[0].plane().normal.y < 0.0);
    }

    #[test]
    fn test_directional_wall() {
        // left of (0,0) -> (100,0) is +y
        let left = WallGeometry::build(&wall().with_direction(WallDirection::Left)).unwrap();
        assert!(left.blocks_from(&Point2d::new(50.0, 10.0)));
        assert!(!left.blocks_from(&Point2d::new(50.0, -10.0)));
        assert_eq!(left.faces_toward(&Point3d::new(50.0, 10.0, 0.0)).len(), 1);
        assert!(left.faces_toward(&Point3d::new(50.0, -10.0, 0.0)).is_empty());

        let right = WallGeometry::build(&wall().with_direction(WallDirection::Right)).unwrap();
        assert!(right.blocks_from(&Point2d::new(50.0, -10.0)));
        assert!(!right.blocks_from(&Point2d::new(50.0, 10.0)));
    }

    #[test]
    fn test_terrain_flag_and_bounds() {
        let geom = WallGeometry::build(&wall().with_elevation(0.0, 20.0).terrain(true)).unwrap();
        assert!(geom.is_terrain());
        let b = geom.bounds();
        assert_eq!(b.max.z, 20.0);
        assert_eq!(b.max.x, 100.0);
        assert!(geom.spans_elevation(10.0));
        assert!(!geom.spans_elevation(30.0));
    }
}

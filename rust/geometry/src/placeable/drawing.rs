// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawing geometry - horizontal polygons.

use super::Placeable;
use crate::error::{Error, Result};
use crate::face::PlanePoints;
use crate::footprint::Footprint;
use crate::point::Point3d;

/// What a drawing does to sight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingRole {
    /// Blocks like a tile
    #[default]
    Floor,
    /// Cuts horizontal obstacles at the same elevation
    Hole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawingData {
    pub shape: Footprint,
    pub elevation: f64,
    pub role: DrawingRole,
}

impl DrawingData {
    pub fn new(shape: Footprint, elevation: f64, role: DrawingRole) -> Self {
        Self { shape, elevation, role }
    }
}

#[derive(Debug, Clone)]
pub struct DrawingGeometry {
    elevation: f64,
    role: DrawingRole,
    faces: Vec<PlanePoints>,
}

impl DrawingGeometry {
    pub fn build(data: &DrawingData) -> Result<Self> {
        if !data.elevation.is_finite() {
            return Err(Error::missing("drawing elevation is not finite"));
        }
        let z = data.elevation;
        let ring = data.shape.ring()?;
        let face = PlanePoints::new(ring.iter().map(|p| Point3d::new(p.x, p.y, z)))?;
        Ok(Self {
            elevation: z,
            role: data.role,
            faces: vec![face],
        })
    }

    #[inline]
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    #[inline]
    pub fn role(&self) -> DrawingRole {
        self.role
    }

    /// The polygon face, whatever its role
    pub fn face(&self) -> &PlanePoints {
        &self.faces[0]
    }
}

impl Placeable for DrawingGeometry {
    /// Hole drawings have no blocking faces
    fn faces(&self) -> &[PlanePoints] {
        match self.role {
            DrawingRole::Floor => &self.faces,
            DrawingRole::Hole => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point2d;

    #[test]
    fn test_floor_and_hole_roles() {
        let shape = Footprint::circle(Point2d::new(50.0, 50.0), 20.0);
        let floor = DrawingGeometry::build(&DrawingData::new(shape.clone(), 10.0, DrawingRole::Floor)).unwrap();
        assert_eq!(floor.faces().len(), 1);
        assert_eq!(floor.face().points().len(), crate::footprint::CIRCLE_SEGMENTS);

        let hole = DrawingGeometry::build(&DrawingData::new(shape, 10.0, DrawingRole::Hole)).unwrap();
        assert!(hole.faces().is_empty());
        assert_eq!(hole.face().points()[0].z, 10.0);
    }

    #[test]
    fn test_drawing_without_area() {
        let line = Footprint::Polygon(vec![Point2d::new(0.0, 0.0), Point2d::new(5.0, 5.0), Point2d::new(10.0, 10.0)]);
        let result = DrawingGeometry::build(&DrawingData::new(line, 0.0, DrawingRole::Floor));
        assert!(matches!(result, Err(Error::MissingObstacleData(_))));
    }
}

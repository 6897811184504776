// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tile geometry - horizontal quads (floors and ceilings).

use super::Placeable;
use crate::error::{Error, Result};
use crate::face::PlanePoints;
use crate::point::{Point2d, Point3d};

/// Host description of an overhead or floor tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub elevation: f64,
    /// Transparent areas of the tile image, in map coordinates
    pub holes: Vec<Vec<Point2d>>,
}

impl TileData {
    pub fn new(x: f64, y: f64, width: f64, height: f64, elevation: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            elevation,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Vec<Point2d>) -> Self {
        self.holes.push(hole);
        self
    }
}

/// The tile face plus one face per hole.
///
/// Hole faces are projected like the tile and subtracted from its projection.
#[derive(Debug, Clone)]
pub struct TileGeometry {
    elevation: f64,
    faces: Vec<PlanePoints>,
    holes: Vec<PlanePoints>,
}

impl TileGeometry {
    pub fn build(data: &TileData) -> Result<Self> {
        if !data.elevation.is_finite() {
            return Err(Error::missing("tile elevation is not finite"));
        }
        let z = data.elevation;
        let (x0, y0) = (data.x.min(data.x + data.width), data.y.min(data.y + data.height));
        let (x1, y1) = (data.x.max(data.x + data.width), data.y.max(data.y + data.height));
        let face = PlanePoints::new([
            Point3d::new(x0, y0, z),
            Point3d::new(x1, y0, z),
            Point3d::new(x1, y1, z),
            Point3d::new(x0, y1, z),
        ])
        .map_err(|e| match e {
            Error::DegenerateGeometry(msg) => Error::missing(format!("tile has no area: {msg}")),
            other => other,
        })?;

        let mut holes = Vec::with_capacity(data.holes.len());
        for hole in &data.holes {
            match PlanePoints::new(hole.iter().map(|p| Point3d::new(p.x, p.y, z))) {
                Ok(face) => holes.push(face),
                Err(err) => tracing::debug!(error = %err, "Skipping degenerate tile hole"),
            }
        }

        Ok(Self {
            elevation: z,
            faces: vec![face],
            holes,
        })
    }

    #[inline]
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn holes(&self) -> &[PlanePoints] {
        &self.holes
    }
}

impl Placeable for TileGeometry {
    fn faces(&self) -> &[PlanePoints] {
        &self.faces
    }
}

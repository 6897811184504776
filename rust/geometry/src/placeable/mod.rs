// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placeable Geometry - obstacles built from planar faces
//!
//! Each sub-module turns one kind of host obstacle into faces:
//!
//! - `wall`: vertical quad(s) between two map points
//! - `tile`: horizontal quad at an elevation, with optional hole faces
//! - `drawing`: horizontal polygon, either a floor or a hole
//! - `token`: vertical prism over a footprint

mod drawing;
mod tile;
mod token;
mod wall;

pub use drawing::{DrawingData, DrawingGeometry, DrawingRole};
pub use tile::{TileData, TileGeometry};
pub use token::TokenPrism;
pub use wall::{WallData, WallDirection, WallGeometry};

use crate::face::PlanePoints;
use crate::point::{Aabb3, Point3d};

/// Obstacle geometry made of planar faces
pub trait Placeable {
    /// Every face of the obstacle
    fn faces(&self) -> &[PlanePoints];

    /// Faces that can be seen from `viewer`
    fn faces_toward(&self, viewer: &Point3d) -> Vec<&PlanePoints> {
        self.faces().iter().filter(|f| f.is_facing(viewer)).collect()
    }

    /// Box around every face
    fn bounds(&self) -> Aabb3 {
        let mut faces = self.faces().iter();
        let Some(first) = faces.next() else {
            return Aabb3::new(Point3d::origin(), Point3d::origin());
        };
        faces.fold(first.bounds(), |acc, f| {
            let b = f.bounds();
            Aabb3::new(
                Point3d::new(acc.min.x.min(b.min.x), acc.min.y.min(b.min.y), acc.min.z.min(b.min.z)),
                Point3d::new(acc.max.x.max(b.max.x), acc.max.y.max(b.max.y), acc.max.z.max(b.max.z)),
            )
        })
    }

    /// Terrain obstacles only block where two of them overlap
    fn is_terrain(&self) -> bool {
        false
    }
}

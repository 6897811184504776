// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Token Cover Geometry
//!
//! Geometry for line-of-sight and cover between tokens on a tactical map:
//! obstacles as planar faces, a look-at camera with near-plane truncation
//! and perspective projection, 2D polygon booleans via i_overlay, and the
//! cheaper tests (segment vs quad, GJK/EPA, quadtree pre-filtering).

pub mod bool2d;
pub mod camera;
pub mod clip;
pub mod coverage;
pub mod error;
pub mod face;
pub mod footprint;
pub mod gjk;
pub mod matrix;
pub mod placeable;
pub mod plane;
pub mod point;
pub mod quadtree;
pub mod ray;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use bool2d::Region;
pub use camera::{Camera, Projection};
pub use clip::{clip_and_project, truncate_ring, ProjectionMode, NEAR_CUTOFF};
pub use coverage::{percent_covered, Coverage};
pub use error::{Error, Result};
pub use face::PlanePoints;
pub use footprint::Footprint;
pub use gjk::{ConvexPolygon, Penetration, Support};
pub use matrix::Matrix4;
pub use placeable::{
    DrawingData, DrawingGeometry, DrawingRole, Placeable, TileData, TileGeometry, TokenPrism, WallData,
    WallDirection, WallGeometry,
};
pub use plane::Plane;
pub use point::{Aabb3, Point2d, Point3d, MAX_ELEVATION};
pub use quadtree::{Bounds2, QuadTree};
pub use ray::SegmentHit;

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Token geometry - a vertical prism over the token footprint.

use super::Placeable;
use crate::error::{Error, Result};
use crate::face::PlanePoints;
use crate::footprint::viewable_edges;
use crate::point::{Point2d, Point3d, EPSILON};

/// Prism with top, bottom and one side quad per footprint edge.
///
/// Faces are stored as `[top, bottom, side_0, side_1, ...]`; side `i` sits
/// on the ring edge `i -> i + 1`.
#[derive(Debug, Clone)]
pub struct TokenPrism {
    ring: Vec<Point2d>,
    bottom: f64,
    top: f64,
    faces: Vec<PlanePoints>,
}

const TOP: usize = 0;
const BOTTOM: usize = 1;
const FIRST_SIDE: usize = 2;

impl TokenPrism {
    /// Build from a counter-clockwise ring
    pub fn build(ring: Vec<Point2d>, bottom: f64, top: f64) -> Result<Self> {
        if !bottom.is_finite() || !top.is_finite() {
            return Err(Error::missing("token elevation is not finite"));
        }
        if top - bottom < EPSILON {
            return Err(Error::degenerate(format!("token has no height ({bottom} to {top})")));
        }
        if ring.len() < 3 {
            return Err(Error::missing("token footprint needs at least 3 points"));
        }

        let mut faces = Vec::with_capacity(ring.len() + 2);
        // CCW seen from above: normal up
        faces.push(PlanePoints::new(ring.iter().map(|p| Point3d::new(p.x, p.y, top)))?.one_sided(true));
        faces.push(
            PlanePoints::new(ring.iter().rev().map(|p| Point3d::new(p.x, p.y, bottom)))?.one_sided(true),
        );
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            // normal to the right of a -> b, outward for a CCW ring
            let side = PlanePoints::new([
                Point3d::new(a.x, a.y, top),
                Point3d::new(a.x, a.y, bottom),
                Point3d::new(b.x, b.y, bottom),
                Point3d::new(b.x, b.y, top),
            ])?;
            faces.push(side.one_sided(true));
        }

        Ok(Self { ring, bottom, top, faces })
    }

    #[inline]
    pub fn ring(&self) -> &[Point2d] {
        &self.ring
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn top_face(&self) -> &PlanePoints {
        &self.faces[TOP]
    }

    pub fn bottom_face(&self) -> &PlanePoints {
        &self.faces[BOTTOM]
    }

    pub fn side_faces(&self) -> &[PlanePoints] {
        &self.faces[FIRST_SIDE..]
    }

    /// Center of the prism
    pub fn center(&self) -> Point3d {
        let sum = self.ring.iter().fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
        let c = sum / self.ring.len() as f64;
        Point3d::new(c.x, c.y, (self.top + self.bottom) * 0.5)
    }

    /// Faces of the prism seen from `viewer`.
    ///
    /// Top only when the viewer is above, bottom only when below, and the side
    /// quads whose outward edge normal faces the viewer.
    pub fn visible_faces(&self, viewer: &Point3d) -> Vec<&PlanePoints> {
        let mut out = Vec::new();
        if viewer.z > self.top + EPSILON {
            out.push(&self.faces[TOP]);
        }
        if viewer.z < self.bottom - EPSILON {
            out.push(&self.faces[BOTTOM]);
        }
        let eye = Point2d::new(viewer.x, viewer.y);
        out.extend(
            viewable_edges(&self.ring, &eye)
                .into_iter()
                .map(|i| &self.faces[FIRST_SIDE + i]),
        );
        out
    }

    /// Map-plane points of the faces `viewer` can see: the whole ring when a
    /// cap is visible (or no side is), otherwise the ends of the viewable edges
    pub fn viewable_outline(&self, viewer: &Point3d) -> Vec<Point2d> {
        let cap_visible = viewer.z > self.top + EPSILON || viewer.z < self.bottom - EPSILON;
        let edges = viewable_edges(&self.ring, &Point2d::new(viewer.x, viewer.y));
        if cap_visible || edges.is_empty() {
            return self.ring.clone();
        }
        let n = self.ring.len();
        let mut out: Vec<Point2d> = Vec::with_capacity(edges.len() + 1);
        for i in edges {
            for p in [self.ring[i], self.ring[(i + 1) % n]] {
                if !out.contains(&p) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Elevation of the part of the prism closest to a viewer at `z`
    pub fn nearest_elevation(&self, z: f64) -> f64 {
        z.clamp(self.bottom, self.top)
    }
}

impl Placeable for TokenPrism {
    fn faces(&self) -> &[PlanePoints] {
        &self.faces
    }

    fn faces_toward(&self, viewer: &Point3d) -> Vec<&PlanePoints> {
        self.visible_faces(viewer)
    }
}

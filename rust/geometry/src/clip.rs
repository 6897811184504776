// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Near-plane truncation and projection of camera-space rings
//!
//! Rings arrive in camera space (camera looking down -z). Only the part with
//! `z <= cutoff` is in front of the near plane. Each pass walks the ring and
//! replaces every crossing edge endpoint that lies past the cutoff with the
//! edge's intersection at the cutoff; passes repeat until every point is in
//! bounds, capped at [`MAX_TRUNCATION_PASSES`].

use crate::point::{towards_z, Point2d, Point3d};
use smallvec::SmallVec;

/// Camera-space z of the near cutoff
pub const NEAR_CUTOFF: f64 = -1.0;

/// Upper bound on truncation passes over one ring
pub const MAX_TRUNCATION_PASSES: usize = 3;

/// Scale applied after the perspective divide
pub const PERSPECTIVE_MULTIPLIER: f64 = 1000.0;

/// Slack when checking that a truncated point respects the cutoff
const CUTOFF_TOLERANCE: f64 = 1e-9;

/// Ring of camera-space points
pub type Ring3 = SmallVec<[Point3d; 8]>;

/// How camera-space points become 2D
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    /// `(x / -z, y / -z) * multiplier`
    Perspective { multiplier: f64 },
    /// Drop z
    Orthogonal,
}

impl Default for ProjectionMode {
    fn default() -> Self {
        ProjectionMode::Perspective {
            multiplier: PERSPECTIVE_MULTIPLIER,
        }
    }
}

#[inline]
fn in_bounds(p: &Point3d, cutoff: f64) -> bool {
    p.z <= cutoff + CUTOFF_TOLERANCE
}

/// One walk over the ring.
///
/// Points in bounds are kept; an out-of-bounds point is replaced by the
/// cutoff intersection of each neighbouring edge that crosses the plane.
fn truncation_pass(ring: &[Point3d], cutoff: f64) -> Ring3 {
    let n = ring.len();
    let mut out = Ring3::new();
    for i in 0..n {
        let prev = &ring[(i + n - 1) % n];
        let curr = &ring[i];
        let next = &ring[(i + 1) % n];

        if in_bounds(curr, cutoff) {
            out.push(*curr);
            continue;
        }
        if in_bounds(prev, cutoff) {
            if let Some(p) = towards_z(prev, curr, cutoff) {
                out.push(p);
            }
        }
        if in_bounds(next, cutoff) {
            if let Some(p) = towards_z(curr, next, cutoff) {
                out.push(p);
            }
        }
    }
    dedup_ring(&mut out);
    out
}

fn dedup_ring(ring: &mut Ring3) {
    ring.dedup_by(|a, b| (*a - *b).norm_squared() < 1e-18);
    while ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).norm_squared() < 1e-18 {
        ring.pop();
    }
}

/// Truncate a camera-space ring to the part with `z <= cutoff`.
///
/// A ring entirely behind the cutoff becomes empty; a ring entirely in front
/// comes back unchanged.
pub fn truncate_ring(ring: &[Point3d], cutoff: f64) -> Ring3 {
    let mut current: Ring3 = ring.iter().copied().collect();
    for _ in 0..MAX_TRUNCATION_PASSES {
        if current.iter().all(|p| in_bounds(p, cutoff)) {
            break;
        }
        if current.iter().all(|p| !in_bounds(p, cutoff)) {
            current.clear();
            break;
        }
        current = truncation_pass(&current, cutoff);
    }
    // anything still out of bounds after the capped passes is dropped
    current.retain(|p| in_bounds(p, cutoff));
    if current.len() < 3 {
        current.clear();
    }
    current
}

/// Perspective divide (or orthogonal drop) of camera-space points
pub fn project_ring(ring: &[Point3d], mode: ProjectionMode) -> Vec<Point2d> {
    match mode {
        ProjectionMode::Perspective { multiplier } => ring
            .iter()
            .map(|p| {
                let depth = -p.z;
                Point2d::new(p.x / depth * multiplier, p.y / depth * multiplier)
            })
            .collect(),
        ProjectionMode::Orthogonal => ring.iter().map(|p| Point2d::new(p.x, p.y)).collect(),
    }
}

/// Truncate then project. Orthogonal projection skips truncation.
pub fn clip_and_project(ring: &[Point3d], cutoff: f64, mode: ProjectionMode) -> Vec<Point2d> {
    match mode {
        ProjectionMode::Perspective { .. } => {
            let truncated = truncate_ring(ring, cutoff);
            if truncated.is_empty() {
                return Vec::new();
            }
            project_ring(&truncated, mode)
        }
        ProjectionMode::Orthogonal => project_ring(ring, mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad(z_near: f64, z_far: f64) -> Vec<Point3d> {
        vec![
            Point3d::new(-1.0, -1.0, z_near),
            Point3d::new(1.0, -1.0, z_near),
            Point3d::new(1.0, 1.0, z_far),
            Point3d::new(-1.0, 1.0, z_far),
        ]
    }

    #[test]
    fn test_ring_in_front_is_unchanged() {
        let ring = quad(-5.0, -10.0);
        let out = truncate_ring(&ring, NEAR_CUTOFF);
        assert_eq!(out.as_slice(), ring.as_slice());
    }

    #[test]
    fn test_ring_behind_is_empty() {
        let ring = quad(2.0, 0.0);
        assert!(truncate_ring(&ring, NEAR_CUTOFF).is_empty());
        assert!(clip_and_project(&ring, NEAR_CUTOFF, ProjectionMode::default()).is_empty());
    }

    #[test]
    fn test_straddling_ring_lands_on_cutoff() {
        // near edge behind the camera, far edge in front
        let ring = quad(3.0, -7.0);
        let out = truncate_ring(&ring, NEAR_CUTOFF);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|p| p.z <= NEAR_CUTOFF + 1e-9));
        let on_cutoff = out.iter().filter(|p| (p.z - NEAR_CUTOFF).abs() < 1e-9).count();
        assert_eq!(on_cutoff, 2);
    }

    #[test]
    fn test_single_corner_behind_adds_vertex() {
        let ring = vec![
            Point3d::new(0.0, 0.0, 4.0),
            Point3d::new(10.0, 0.0, -6.0),
            Point3d::new(10.0, 10.0, -6.0),
            Point3d::new(0.0, 10.0, -6.0),
        ];
        let out = truncate_ring(&ring, NEAR_CUTOFF);
        // one corner clipped off turns the quad into a pentagon
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|p| p.z <= NEAR_CUTOFF + 1e-9));
    }

    #[test]
    fn test_perspective_divide() {
        let ring = vec![Point3d::new(2.0, -4.0, -2.0)];
        let flat = project_ring(&ring, ProjectionMode::Perspective { multiplier: 10.0 });
        assert_relative_eq!(flat[0].x, 10.0);
        assert_relative_eq!(flat[0].y, -20.0);

        let ortho = project_ring(&ring, ProjectionMode::Orthogonal);
        assert_relative_eq!(ortho[0].x, 2.0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar faces of obstacles
//!
//! A [`PlanePoints`] is one closed, planar ring of scene points together with
//! the same ring after a view transform. The transformed copy is recomputed
//! every time a view matrix is set.

use crate::clip::{clip_and_project, ProjectionMode, Ring3, NEAR_CUTOFF};
use crate::error::{Error, Result};
use crate::matrix::Matrix4;
use crate::plane::Plane;
use crate::point::{is_finite_point, Aabb3, Point2d, Point3d, EPSILON};

/// One planar face of an obstacle
#[derive(Debug, Clone)]
pub struct PlanePoints {
    points: Ring3,
    transformed: Ring3,
    view_set: bool,
    plane: Plane,
    one_sided: bool,
}

impl PlanePoints {
    /// Build a face from an ordered ring.
    ///
    /// Fails with `DegenerateGeometry` for fewer than 3 points or a ring
    /// whose points are all collinear.
    pub fn new(points: impl IntoIterator<Item = Point3d>) -> Result<Self> {
        let points: Ring3 = points.into_iter().collect();
        if points.len() < 3 {
            return Err(Error::degenerate(format!(
                "face needs at least 3 points, got {}",
                points.len()
            )));
        }
        if !points.iter().all(is_finite_point) {
            return Err(Error::missing("face has non-finite coordinates"));
        }
        let plane = plane_of_ring(&points)?;
        Ok(Self {
            points,
            transformed: Ring3::new(),
            view_set: false,
            plane,
            one_sided: false,
        })
    }

    /// Mark the face as visible only from the side its normal points to
    pub fn one_sided(mut self, one_sided: bool) -> Self {
        self.one_sided = one_sided;
        self
    }

    #[inline]
    pub fn points(&self) -> &[Point3d] {
        &self.points
    }

    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    #[inline]
    pub fn is_one_sided(&self) -> bool {
        self.one_sided
    }

    /// True if the face can be seen from `viewer`.
    ///
    /// Two-sided faces are always visible unless the viewer sits in their plane.
    pub fn is_facing(&self, viewer: &Point3d) -> bool {
        let d = self.plane.signed_distance(viewer);
        if self.one_sided {
            d > EPSILON
        } else {
            d.abs() > EPSILON
        }
    }

    /// Apply a view transform; replaces any previous transform.
    pub fn set_view_matrix(&mut self, m: &Matrix4) {
        self.transformed.clear();
        self.transformed
            .extend(self.points.iter().map(|p| m.transform_point(p)));
        self.view_set = true;
    }

    pub fn clear_view(&mut self) {
        self.transformed.clear();
        self.view_set = false;
    }

    #[inline]
    pub fn has_view(&self) -> bool {
        self.view_set
    }

    /// Points after the current view transform, `None` if no view is set
    pub fn transformed(&self) -> Option<&[Point3d]> {
        self.view_set.then_some(self.transformed.as_slice())
    }

    /// Truncate the transformed ring at the near cutoff and project to 2D.
    ///
    /// Without a view the raw points are used as camera space.
    pub fn project(&self, mode: ProjectionMode) -> Vec<Point2d> {
        let ring = if self.view_set {
            &self.transformed
        } else {
            &self.points
        };
        clip_and_project(ring, NEAR_CUTOFF, mode)
    }

    pub fn centroid(&self) -> Point3d {
        let sum = self
            .points
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
        Point3d::from(sum / self.points.len() as f64)
    }

    pub fn bounds(&self) -> Aabb3 {
        // a face always has at least 3 points
        Aabb3::from_points(self.points.iter()).unwrap_or(Aabb3 {
            min: self.points[0],
            max: self.points[0],
        })
    }

    /// Same ring in reverse order (normal flipped)
    pub fn reversed(&self) -> Result<Self> {
        Ok(Self::new(self.points.iter().rev().copied())?.one_sided(self.one_sided))
    }

    /// The part of the face on `keep`'s side of `plane`; `None` when no area
    /// is left. The view transform is not carried over.
    pub fn clipped(&self, plane: &Plane, keep: &Point3d) -> Option<Self> {
        let ring = plane.clip_ring(&self.points, keep);
        Self::new(ring).ok().map(|face| face.one_sided(self.one_sided))
    }

    /// All points of the transformed ring lie further than `far` from the camera
    pub fn beyond_far(&self, far: f64) -> bool {
        self.view_set && self.transformed.iter().all(|p| -p.z > far)
    }
}

/// Plane of a ring using the first non-collinear triple after the first point
fn plane_of_ring(points: &[Point3d]) -> Result<Plane> {
    let a = &points[0];
    for i in 1..points.len() - 1 {
        for j in (i + 1)..points.len() {
            if let Ok(plane) = Plane::from_points(a, &points[i], &points[j]) {
                return Ok(plane);
            }
        }
    }
    Err(Error::degenerate("face points are collinear"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::PERSPECTIVE_MULTIPLIER;
    use nalgebra::Vector3;

    fn wall_face() -> PlanePoints {
        PlanePoints::new([
            Point3d::new(0.0, 0.0, 10.0),
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(10.0, 0.0, 0.0),
            Point3d::new(10.0, 0.0, 10.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_collinear_face_is_degenerate() {
        let result = PlanePoints::new([
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
        ]);
        assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
    }

    #[test]
    fn test_non_finite_face_is_missing_data() {
        let result = PlanePoints::new([
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, f64::NAN, 0.0),
            Point3d::new(2.0, 1.0, 0.0),
        ]);
        assert!(matches!(result, Err(Error::MissingObstacleData(_))));
    }

    #[test]
    fn test_clipped_to_plane_side() {
        let face = wall_face().one_sided(true);
        let cut = Plane::new(Point3d::new(4.0, 0.0, 0.0), Vector3::x()).unwrap();

        let near = face.clipped(&cut, &Point3d::new(-10.0, 0.0, 0.0)).unwrap();
        assert!(near.is_one_sided());
        assert!((near.bounds().max.x - 4.0).abs() < 1e-9);
        assert!(near.bounds().min.x.abs() < 1e-9);

        let beyond = Plane::new(Point3d::new(20.0, 0.0, 0.0), Vector3::x()).unwrap();
        assert!(face.clipped(&beyond, &Point3d::new(30.0, 0.0, 0.0)).is_none());
        assert_eq!(face.clipped(&beyond, &Point3d::origin()).map(|f| f.points().len()), Some(4));
    }

    #[test]
    fn test_one_sided_facing() {
        let face = wall_face().one_sided(true);
        // normal of this ring points to -y
        assert!(face.is_facing(&Point3d::new(5.0, -10.0, 5.0)));
        assert!(!face.is_facing(&Point3d::new(5.0, 10.0, 5.0)));
        let back = face.reversed().unwrap();
        assert!(back.is_facing(&Point3d::new(5.0, 10.0, 5.0)));
        assert!(wall_face().is_facing(&Point3d::new(5.0, 10.0, 5.0)));
    }

    #[test]
    fn test_view_matrix_sets_transformed_points() {
        let mut face = wall_face();
        assert!(face.transformed().is_none());
        face.set_view_matrix(&Matrix4::translation(0.0, 0.0, -20.0));
        assert!(face.has_view());
        assert_eq!(face.transformed().unwrap()[0].z, -10.0);
        face.clear_view();
        assert!(!face.has_view());
    }

    #[test]
    fn test_project_through_look_at() {
        let mut face = wall_face();
        let look = Matrix4::look_at(
            &Point3d::new(5.0, -20.0, 5.0),
            &Point3d::new(5.0, 0.0, 5.0),
            &Vector3::z(),
        )
        .unwrap();
        face.set_view_matrix(&look.view);
        let flat = face.project(ProjectionMode::default());
        assert_eq!(flat.len(), 4);
        // the 10x10 face at distance 20 spans 500 units after projection
        let xs: Vec<f64> = flat.iter().map(|p| p.x).collect();
        let width = xs.iter().cloned().fold(f64::MIN, f64::max) - xs.iter().cloned().fold(f64::MAX, f64::min);
        assert!((width - 10.0 / 20.0 * PERSPECTIVE_MULTIPLIER).abs() < 1e-6);
        assert!(face.beyond_far(10.0));
        assert!(!face.beyond_far(30.0));
    }
}

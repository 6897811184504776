// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera with lazily derived view matrices
//!
//! Setters only mark matrices dirty. Getters rebuild what is stale:
//! camera/target/up invalidate the look-at matrix, projection parameters
//! invalidate the projection matrix, and either one invalidates the model
//! matrix and its inverse.

use crate::error::{Error, Result};
use crate::matrix::{LookAt, Matrix4};
use crate::point::{Aabb3, Point3d};
use nalgebra::Vector3;
use std::cell::Cell;
use std::f64::consts::PI;

/// Default near plane distance
pub const DEFAULT_NEAR: f64 = 1.0;

/// Projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Full vertical field of view, radians
        fov_y: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
    Orthogonal {
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        near: f64,
        far: f64,
    },
}

impl Projection {
    pub fn perspective() -> Self {
        Projection::Perspective {
            fov_y: PI / 2.0,
            aspect: 1.0,
            near: DEFAULT_NEAR,
            far: 1000.0,
        }
    }

    #[inline]
    pub fn far(&self) -> f64 {
        match *self {
            Projection::Perspective { far, .. } | Projection::Orthogonal { far, .. } => far,
        }
    }

    #[inline]
    pub fn near(&self) -> f64 {
        match *self {
            Projection::Perspective { near, .. } | Projection::Orthogonal { near, .. } => near,
        }
    }

    fn matrix(&self) -> Matrix4 {
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => Matrix4::perspective(fov_y, aspect, near, far),
            Projection::Orthogonal { left, right, bottom, top, near, far } => {
                Matrix4::orthographic(left, right, bottom, top, near, far)
            }
        }
    }
}

/// Camera placed at an attacker's eye, aimed at a target
#[derive(Debug, Clone)]
pub struct Camera {
    position: Point3d,
    target: Point3d,
    up: Vector3<f64>,
    projection: Projection,
    look_at: Cell<Option<LookAt>>,
    projection_matrix: Cell<Option<Matrix4>>,
    model: Cell<Option<Matrix4>>,
    inverse_model: Cell<Option<Matrix4>>,
    warned_singular: Cell<bool>,
    rebuilds: Cell<u32>,
}

impl Camera {
    pub fn new(position: Point3d, target: Point3d) -> Self {
        Self::with_projection(position, target, Projection::perspective())
    }

    pub fn with_projection(position: Point3d, target: Point3d, projection: Projection) -> Self {
        Self {
            position,
            target,
            up: Vector3::z(),
            projection,
            look_at: Cell::new(None),
            projection_matrix: Cell::new(None),
            model: Cell::new(None),
            inverse_model: Cell::new(None),
            warned_singular: Cell::new(false),
            rebuilds: Cell::new(0),
        }
    }

    #[inline]
    pub fn position(&self) -> Point3d {
        self.position
    }

    #[inline]
    pub fn target(&self) -> Point3d {
        self.target
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn set_position(&mut self, position: Point3d) {
        if position != self.position {
            self.position = position;
            self.mark_view_dirty();
        }
    }

    pub fn set_target(&mut self, target: Point3d) {
        if target != self.target {
            self.target = target;
            self.mark_view_dirty();
        }
    }

    pub fn set_up(&mut self, up: Vector3<f64>) {
        if up != self.up {
            self.up = up;
            self.mark_view_dirty();
        }
    }

    pub fn set_projection(&mut self, projection: Projection) {
        if projection != self.projection {
            self.projection = projection;
            self.projection_matrix.set(None);
            self.mark_model_dirty();
        }
    }

    fn mark_view_dirty(&self) {
        self.look_at.set(None);
        self.mark_model_dirty();
    }

    fn mark_model_dirty(&self) {
        self.model.set(None);
        self.inverse_model.set(None);
    }

    /// Number of matrices rebuilt so far
    #[inline]
    pub fn rebuild_count(&self) -> u32 {
        self.rebuilds.get()
    }

    fn bump(&self) {
        self.rebuilds.set(self.rebuilds.get() + 1);
    }

    fn look_at(&self) -> Result<LookAt> {
        if let Some(look_at) = self.look_at.get() {
            return Ok(look_at);
        }
        let look_at = Matrix4::look_at(&self.position, &self.target, &self.up)?;
        self.bump();
        self.look_at.set(Some(look_at));
        Ok(look_at)
    }

    /// World to camera space; the camera looks down -z
    pub fn look_at_matrix(&self) -> Result<Matrix4> {
        Ok(self.look_at()?.view)
    }

    /// Camera to world space
    pub fn inverse_look_at_matrix(&self) -> Result<Matrix4> {
        Ok(self.look_at()?.inverse)
    }

    pub fn projection_matrix(&self) -> Matrix4 {
        if let Some(m) = self.projection_matrix.get() {
            return m;
        }
        let m = self.projection.matrix();
        self.bump();
        self.projection_matrix.set(Some(m));
        m
    }

    /// Look-at followed by projection
    pub fn model_matrix(&self) -> Result<Matrix4> {
        if let Some(m) = self.model.get() {
            return Ok(m);
        }
        let m = self.look_at_matrix()?.multiply(&self.projection_matrix());
        self.bump();
        self.model.set(Some(m));
        Ok(m)
    }

    /// Inverse of [`Camera::model_matrix`].
    ///
    /// A singular model matrix falls back to identity; the first fallback
    /// per camera is logged.
    pub fn inverse_model_matrix(&self) -> Result<Matrix4> {
        if let Some(m) = self.inverse_model.get() {
            return Ok(m);
        }
        let inverse = match self.model_matrix()?.invert() {
            Ok(m) => m,
            Err(Error::SingularMatrix { determinant }) => {
                if !self.warned_singular.replace(true) {
                    tracing::warn!(
                        determinant,
                        position = ?self.position,
                        target = ?self.target,
                        "Singular model matrix, using identity"
                    );
                }
                Matrix4::identity()
            }
            Err(other) => return Err(other),
        };
        self.bump();
        self.inverse_model.set(Some(inverse));
        Ok(inverse)
    }

    /// Aim at the box center and fit the frustum around the box
    pub fn set_frustum_for_aabb3d(&mut self, aabb: &Aabb3) -> Result<()> {
        let center = aabb.center();
        self.set_target(center);
        match self.projection {
            Projection::Perspective { aspect, near, .. } => {
                let r = aabb.radius();
                let d = (self.position - center).norm();
                let fov_y = if d <= r { PI } else { 2.0 * (r / d).asin() };
                self.set_projection(Projection::Perspective {
                    fov_y,
                    aspect,
                    near,
                    far: d + r,
                });
            }
            Projection::Orthogonal { .. } => {
                let view = self.look_at_matrix()?;
                let corners = aabb.corners().map(|c| view.transform_point(&c));
                let mut min = corners[0];
                let mut max = corners[0];
                for c in &corners[1..] {
                    min = min.inf(c);
                    max = max.sup(c);
                }
                self.set_projection(Projection::Orthogonal {
                    left: min.x,
                    right: max.x,
                    bottom: min.y,
                    top: max.y,
                    near: -max.z,
                    far: -min.z,
                });
            }
        }
        Ok(())
    }
}

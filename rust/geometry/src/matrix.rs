// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Homogeneous 4x4 transforms
//!
//! Matrices are stored row-major and applied to row vectors:
//! `[x y z 1] * M`. Composition therefore reads left to right,
//! `a.multiply(&b)` applies `a` first and then `b`. Translation lives in the
//! bottom row.
//!
//! Inversion uses cofactor expansion with closed forms for 2x2, 3x3 and 4x4
//! and a general NxN fallback for anything larger.

use crate::error::{Error, Result};
use crate::point::Point3d;
use nalgebra::{DMatrix, RowVector4, Vector3};
use std::ops::Mul;

/// Determinant magnitude below which a matrix is treated as singular
pub const MATRIX_EPSILON: f64 = 1e-8;

/// Row-major homogeneous transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    m: nalgebra::Matrix4<f64>,
}

/// A look-at transform and its inverse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAt {
    /// World to camera space. The camera looks down its -z axis.
    pub view: Matrix4,
    /// Camera to world space
    pub inverse: Matrix4,
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    #[inline]
    pub fn identity() -> Self {
        Self {
            m: nalgebra::Matrix4::identity(),
        }
    }

    /// Build from rows
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut m = nalgebra::Matrix4::zeros();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                m[(r, c)] = *value;
            }
        }
        Self { m }
    }

    /// Copy out as rows
    pub fn rows(&self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.m[(r, c)];
            }
        }
        rows
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[(row, col)]
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [x, y, z, 1.0],
        ])
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self::from_rows([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation about +x (radians)
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation about +y (radians)
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation about +z (radians)
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about x, then y, then z
    pub fn rotation_xyz(x: f64, y: f64, z: f64) -> Self {
        Self::rotation_x(x)
            .multiply(&Self::rotation_y(y))
            .multiply(&Self::rotation_z(z))
    }

    /// Right-handed perspective projection (OpenGL clip conventions).
    ///
    /// `fov_y` is the full vertical field of view in radians.
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        let range_inv = 1.0 / (near - far);
        Self::from_rows([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (near + far) * range_inv, -1.0],
            [0.0, 0.0, 2.0 * near * far * range_inv, 0.0],
        ])
    }

    /// Orthographic projection of the camera-space box into the clip cube
    pub fn orthographic(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        let w = right - left;
        let h = top - bottom;
        let d = far - near;
        Self::from_rows([
            [2.0 / w, 0.0, 0.0, 0.0],
            [0.0, 2.0 / h, 0.0, 0.0],
            [0.0, 0.0, -2.0 / d, 0.0],
            [-(right + left) / w, -(top + bottom) / h, -(far + near) / d, 1.0],
        ])
    }

    /// Look-at transform for a camera at `camera` aimed at `target`.
    ///
    /// When `up` is parallel to the view direction (camera straight above or
    /// below the target) an axis-aligned basis is used instead of the cross
    /// product, which would be zero length.
    pub fn look_at(camera: &Point3d, target: &Point3d, up: &Vector3<f64>) -> Result<LookAt> {
        let forward = (camera - target)
            .try_normalize(MATRIX_EPSILON)
            .ok_or_else(|| Error::degenerate("camera and target coincide"))?;

        let (right, true_up) = match up.cross(&forward).try_normalize(MATRIX_EPSILON) {
            Some(right) => {
                let true_up = forward.cross(&right);
                (right, true_up)
            }
            None if forward.z >= 0.0 => (Vector3::x(), Vector3::y()),
            None => (Vector3::x(), -Vector3::y()),
        };

        let inverse = Self::from_rows([
            [right.x, right.y, right.z, 0.0],
            [true_up.x, true_up.y, true_up.z, 0.0],
            [forward.x, forward.y, forward.z, 0.0],
            [camera.x, camera.y, camera.z, 1.0],
        ]);

        let c = camera.coords;
        let view = Self::from_rows([
            [right.x, true_up.x, forward.x, 0.0],
            [right.y, true_up.y, forward.y, 0.0],
            [right.z, true_up.z, forward.z, 0.0],
            [-right.dot(&c), -true_up.dot(&c), -forward.dot(&c), 1.0],
        ]);

        Ok(LookAt { view, inverse })
    }

    /// `self` followed by `other`
    #[inline]
    pub fn multiply(&self, other: &Matrix4) -> Matrix4 {
        Matrix4 { m: self.m * other.m }
    }

    #[inline]
    pub fn transpose(&self) -> Matrix4 {
        Matrix4 {
            m: self.m.transpose(),
        }
    }

    /// Homogeneous transform without the w divide
    #[inline]
    pub fn transform_homogeneous(&self, p: &Point3d) -> (Point3d, f64) {
        let v = RowVector4::new(p.x, p.y, p.z, 1.0) * self.m;
        (Point3d::new(v[0], v[1], v[2]), v[3])
    }

    /// Transform a point, dividing by w when it is not 1 (or 0)
    #[inline]
    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let (q, w) = self.transform_homogeneous(p);
        if w.abs() > MATRIX_EPSILON && (w - 1.0).abs() > f64::EPSILON {
            Point3d::from(q.coords / w)
        } else {
            q
        }
    }

    /// Transform a direction (ignores translation)
    #[inline]
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let r = RowVector4::new(v.x, v.y, v.z, 0.0) * self.m;
        Vector3::new(r[0], r[1], r[2])
    }

    pub fn determinant(&self) -> f64 {
        det4(&self.m)
    }

    /// Inverse via the 4x4 cofactor closed form.
    ///
    /// Fails with [`Error::SingularMatrix`] when `|det| < MATRIX_EPSILON`.
    pub fn invert(&self) -> Result<Matrix4> {
        let det = det4(&self.m);
        if !det.is_finite() || det.abs() < MATRIX_EPSILON {
            return Err(Error::SingularMatrix { determinant: det });
        }
        let mut inv = nalgebra::Matrix4::zeros();
        for r in 0..4 {
            for c in 0..4 {
                // adjugate is the transposed cofactor matrix
                inv[(c, r)] = cofactor4(&self.m, r, c) / det;
            }
        }
        Ok(Matrix4 { m: inv })
    }

    /// Element-wise comparison within `epsilon`
    pub fn almost_equal(&self, other: &Matrix4, epsilon: f64) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.multiply(&rhs)
    }
}

#[inline]
fn det2(a: f64, b: f64, c: f64, d: f64) -> f64 {
    a * d - b * c
}

#[inline]
fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * det2(m[1][1], m[1][2], m[2][1], m[2][2])
        - m[0][1] * det2(m[1][0], m[1][2], m[2][0], m[2][2])
        + m[0][2] * det2(m[1][0], m[1][1], m[2][0], m[2][1])
}

/// 3x3 minor of a 4x4 matrix with `row` and `col` removed
fn minor4(m: &nalgebra::Matrix4<f64>, row: usize, col: usize) -> f64 {
    let mut sub = [[0.0; 3]; 3];
    let mut sr = 0;
    for r in 0..4 {
        if r == row {
            continue;
        }
        let mut sc = 0;
        for c in 0..4 {
            if c == col {
                continue;
            }
            sub[sr][sc] = m[(r, c)];
            sc += 1;
        }
        sr += 1;
    }
    det3(sub)
}

#[inline]
fn cofactor4(m: &nalgebra::Matrix4<f64>, row: usize, col: usize) -> f64 {
    let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
    sign * minor4(m, row, col)
}

fn det4(m: &nalgebra::Matrix4<f64>) -> f64 {
    (0..4).map(|c| m[(0, c)] * cofactor4(m, 0, c)).sum()
}

/// Determinant of a square matrix by cofactor expansion
pub fn determinant(m: &DMatrix<f64>) -> Result<f64> {
    let n = square_size(m)?;
    Ok(match n {
        0 => 1.0,
        1 => m[(0, 0)],
        2 => det2(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]),
        3 => det3([
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]),
        _ => laplace_determinant(m),
    })
}

/// Inverse of a square matrix.
///
/// 2x2, 3x3 and 4x4 take the closed-form paths; larger matrices use the
/// general adjugate, which is only meant for small sizes.
pub fn invert_square(m: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let n = square_size(m)?;
    if n == 0 {
        return Err(Error::degenerate("empty matrix"));
    }

    if n == 4 {
        let fixed = nalgebra::Matrix4::from_fn(|r, c| m[(r, c)]);
        let inv = Matrix4 { m: fixed }.invert()?;
        return Ok(DMatrix::from_fn(4, 4, |r, c| inv.m[(r, c)]));
    }

    let det = determinant(m)?;
    if !det.is_finite() || det.abs() < MATRIX_EPSILON {
        return Err(Error::SingularMatrix { determinant: det });
    }

    match n {
        1 => Ok(DMatrix::from_element(1, 1, 1.0 / det)),
        2 => Ok(DMatrix::from_row_slice(
            2,
            2,
            &[
                m[(1, 1)] / det,
                -m[(0, 1)] / det,
                -m[(1, 0)] / det,
                m[(0, 0)] / det,
            ],
        )),
        _ => {
            let mut inv = DMatrix::zeros(n, n);
            for r in 0..n {
                for c in 0..n {
                    let sign = if (r + c) % 2 == 0 { 1.0 } else { -1.0 };
                    let minor = determinant(&remove_row_col(m, r, c))?;
                    inv[(c, r)] = sign * minor / det;
                }
            }
            Ok(inv)
        }
    }
}

fn square_size(m: &DMatrix<f64>) -> Result<usize> {
    if m.nrows() != m.ncols() {
        return Err(Error::degenerate(format!(
            "matrix is {}x{}, expected square",
            m.nrows(),
            m.ncols()
        )));
    }
    Ok(m.nrows())
}

fn remove_row_col(m: &DMatrix<f64>, row: usize, col: usize) -> DMatrix<f64> {
    m.clone().remove_row(row).remove_column(col)
}

fn laplace_determinant(m: &DMatrix<f64>) -> f64 {
    let n = m.nrows();
    if n <= 3 {
        // square_size already checked; sizes below 4 never fail
        return determinant(m).unwrap_or(0.0);
    }
    (0..n)
        .map(|c| {
            let sign = if c % 2 == 0 { 1.0 } else { -1.0 };
            sign * m[(0, c)] * laplace_determinant(&remove_row_col(m, 0, c))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_inverse_is_exact() {
        let inv = Matrix4::identity().invert().unwrap();
        assert_eq!(inv, Matrix4::identity());
    }

    #[test]
    fn test_translation_moves_point() {
        let m = Matrix4::translation(1.0, 2.0, 3.0);
        let p = m.transform_point(&Point3d::new(1.0, 1.0, 1.0));
        assert_eq!(p, Point3d::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let m = Matrix4::rotation_z(FRAC_PI_2);
        let p = m.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_composition_order() {
        // translate then rotate: (1,0,0) -> (2,0,0) -> (0,2,0)
        let m = Matrix4::translation(1.0, 0.0, 0.0).multiply(&Matrix4::rotation_z(FRAC_PI_2));
        let p = m.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invert_round_trip() {
        let m = Matrix4::rotation_xyz(0.3, -1.1, 2.0)
            .multiply(&Matrix4::translation(5.0, -3.0, 12.0))
            .multiply(&Matrix4::scale(2.0, 3.0, 0.5));
        let inv = m.invert().unwrap();
        assert!(m.multiply(&inv).almost_equal(&Matrix4::identity(), 1e-9));
        assert_relative_eq!(m.determinant(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_singular_matrix_fails() {
        let m = Matrix4::scale(1.0, 0.0, 1.0);
        assert!(matches!(m.invert(), Err(Error::SingularMatrix { .. })));
    }

    #[test]
    fn test_look_at_places_target_on_negative_z() {
        let camera = Point3d::new(0.0, -10.0, 5.0);
        let target = Point3d::new(0.0, 10.0, 5.0);
        let look = Matrix4::look_at(&camera, &target, &Vector3::z()).unwrap();
        let t = look.view.transform_point(&target);
        assert_relative_eq!(t.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(t.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(t.z, -20.0, epsilon = 1e-9);
        // a point above the target is "up" in camera space
        let above = look.view.transform_point(&Point3d::new(0.0, 10.0, 6.0));
        assert!(above.y > 0.0);
        assert!(look.view.multiply(&look.inverse).almost_equal(&Matrix4::identity(), 1e-9));
    }

    #[test]
    fn test_look_at_straight_down_uses_axis_basis() {
        let camera = Point3d::new(3.0, 3.0, 100.0);
        let target = Point3d::new(3.0, 3.0, 0.0);
        let look = Matrix4::look_at(&camera, &target, &Vector3::z()).unwrap();
        let t = look.view.transform_point(&target);
        assert_relative_eq!(t.z, -100.0, epsilon = 1e-9);
        assert!(t.x.is_finite() && t.y.is_finite());

        let below = Matrix4::look_at(&target, &camera, &Vector3::z()).unwrap();
        let t = below.view.transform_point(&camera);
        assert_relative_eq!(t.z, -100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_look_at_coincident_points() {
        let p = Point3d::new(1.0, 1.0, 1.0);
        assert!(matches!(
            Matrix4::look_at(&p, &p, &Vector3::z()),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_perspective_divides_by_depth() {
        let m = Matrix4::perspective(FRAC_PI_2, 1.0, 1.0, 100.0);
        let near = m.transform_point(&Point3d::new(0.0, 0.0, -1.0));
        let far = m.transform_point(&Point3d::new(0.0, 0.0, -100.0));
        assert_relative_eq!(near.z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-9);
        let edge = m.transform_point(&Point3d::new(10.0, 0.0, -10.0));
        assert_relative_eq!(edge.x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_orthographic_maps_box_to_cube() {
        let m = Matrix4::orthographic(-2.0, 2.0, -1.0, 1.0, 1.0, 11.0);
        let p = m.transform_point(&Point3d::new(2.0, 1.0, -11.0));
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 1.0);
        assert_relative_eq!(p.z, 1.0);
    }

    #[test]
    fn test_invert_square_small_sizes() {
        let m2 = DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        let inv2 = invert_square(&m2).unwrap();
        assert!((&m2 * &inv2 - DMatrix::identity(2, 2)).abs().max() < 1e-12);

        let m3 = DMatrix::from_row_slice(3, 3, &[2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 1.0]);
        let inv3 = invert_square(&m3).unwrap();
        assert!((&m3 * &inv3 - DMatrix::identity(3, 3)).abs().max() < 1e-12);
    }

    #[test]
    fn test_invert_square_general_fallback() {
        let m5 = DMatrix::from_fn(5, 5, |r, c| if r == c { 2.0 } else { (r + c) as f64 * 0.05 });
        let inv5 = invert_square(&m5).unwrap();
        assert!((&m5 * &inv5 - DMatrix::identity(5, 5)).abs().max() < 1e-9);

        let singular = DMatrix::from_element(5, 5, 1.0);
        assert!(matches!(invert_square(&singular), Err(Error::SingularMatrix { .. })));
        assert!(invert_square(&DMatrix::zeros(2, 3)).is_err());
    }
}

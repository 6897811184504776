// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for Projected Obstacles
//!
//! Projected faces are combined into [`Region`]s using the i_overlay crate.
//! Only the four operations the cover reduction needs are exposed: union,
//! intersection, difference and area.

use crate::point::Point2d;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// i_overlay contour format
type Path = Vec<[f64; 2]>;

/// A set of polygons with holes.
///
/// Each shape stores its outer boundary first, followed by its holes,
/// matching the layout i_overlay returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Region {
    shapes: Vec<Vec<Path>>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Region bounded by one contour. Degenerate contours give an empty region.
    pub fn from_contour(contour: &[Point2d]) -> Self {
        if !is_valid_contour(contour) {
            return Self::empty();
        }
        Self {
            shapes: vec![vec![contour_to_path(&ensure_ccw(contour))]],
        }
    }

    /// Union of several contours
    pub fn from_contours<'a>(contours: impl IntoIterator<Item = &'a [Point2d]>) -> Self {
        Self::union_all(contours.into_iter().map(Self::from_contour))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of disjoint shapes
    #[inline]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn union(&self, other: &Region) -> Region {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        self.overlay(other, OverlayRule::Union)
    }

    pub fn intersect(&self, other: &Region) -> Region {
        if self.is_empty() || other.is_empty() {
            return Region::empty();
        }
        self.overlay(other, OverlayRule::Intersect)
    }

    pub fn difference(&self, other: &Region) -> Region {
        if self.is_empty() {
            return Region::empty();
        }
        if other.is_empty() {
            return self.clone();
        }
        self.overlay(other, OverlayRule::Difference)
    }

    /// Fold a sequence of regions into their union
    pub fn union_all(regions: impl IntoIterator<Item = Region>) -> Region {
        let mut regions = regions.into_iter().filter(|r| !r.is_empty());
        let Some(first) = regions.next() else {
            return Region::empty();
        };
        // Every other region goes into one clip; non-zero fill merges overlaps within it
        let clip: Vec<Path> = regions.flat_map(|r| r.to_paths()).collect();
        if clip.is_empty() {
            return first;
        }
        let subject = first.to_paths();
        Region::from_shapes(subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero))
    }

    /// Enclosed area: outer boundaries minus holes
    pub fn area(&self) -> f64 {
        self.shapes
            .iter()
            .map(|shape| {
                let mut contours = shape.iter().map(|c| path_signed_area(c).abs());
                let outer = contours.next().unwrap_or(0.0);
                let holes: f64 = contours.sum();
                (outer - holes).max(0.0)
            })
            .sum()
    }

    /// All contours, outer boundaries counter-clockwise and holes clockwise
    pub fn contours(&self) -> Vec<Vec<Point2d>> {
        let mut out = Vec::new();
        for shape in &self.shapes {
            for (i, path) in shape.iter().enumerate() {
                let contour: Vec<Point2d> = path.iter().map(|p| Point2d::new(p[0], p[1])).collect();
                out.push(if i == 0 { ensure_ccw(&contour) } else { ensure_cw(&contour) });
            }
        }
        out
    }

    /// Outer boundary of each shape
    pub fn outer_contours(&self) -> impl Iterator<Item = Vec<Point2d>> + '_ {
        self.shapes
            .iter()
            .filter_map(|shape| shape.first())
            .map(|path| path.iter().map(|p| Point2d::new(p[0], p[1])).collect())
    }

    fn overlay(&self, other: &Region, rule: OverlayRule) -> Region {
        let subject = self.to_paths();
        let clip = other.to_paths();
        Region::from_shapes(subject.overlay(&clip, rule, FillRule::NonZero))
    }

    /// Flatten into i_overlay paths with outer boundaries CCW and holes CW so
    /// that non-zero filling reproduces the holes.
    fn to_paths(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        for shape in &self.shapes {
            for (i, path) in shape.iter().enumerate() {
                let area = path_signed_area(path);
                let wrong_way = if i == 0 { area < 0.0 } else { area > 0.0 };
                if wrong_way {
                    paths.push(path.iter().rev().copied().collect());
                } else {
                    paths.push(path.clone());
                }
            }
        }
        paths
    }

    /// Keep shapes whose outer boundary has area, and their non-degenerate holes
    fn from_shapes(shapes: Vec<Vec<Path>>) -> Region {
        let shapes = shapes
            .into_iter()
            .filter(|shape| {
                shape
                    .first()
                    .is_some_and(|outer| outer.len() >= 3 && path_signed_area(outer).abs() > MIN_AREA_THRESHOLD)
            })
            .map(|shape| {
                let mut iter = shape.into_iter();
                let mut kept: Vec<Path> = iter.next().into_iter().collect();
                kept.extend(
                    iter.filter(|hole| hole.len() >= 3 && path_signed_area(hole).abs() > MIN_AREA_THRESHOLD),
                );
                kept
            })
            .collect();
        Region { shapes }
    }
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2d]) -> bool {
    if contour.len() < 3 {
        return false;
    }
    if !contour.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        return false;
    }

    let area = compute_signed_area(contour).abs();
    area > MIN_AREA_THRESHOLD
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2d]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

fn path_signed_area(path: &[[f64; 2]]) -> f64 {
    let n = path.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += path[i][0] * path[j][1] - path[j][0] * path[i][1];
    }
    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2d]) -> Vec<Point2d> {
    let area = compute_signed_area(contour);
    if area < 0.0 {
        // Clockwise - reverse to make counter-clockwise
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2d]) -> Vec<Point2d> {
    let area = compute_signed_area(contour);
    if area > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Simplify a contour by removing collinear points
pub fn simplify_contour(contour: &[Point2d], epsilon: f64) -> Vec<Point2d> {
    if contour.len() <= 3 {
        return contour.to_vec();
    }

    let mut result = Vec::with_capacity(contour.len());
    let n = contour.len();

    for i in 0..n {
        let prev = &contour[(i + n - 1) % n];
        let curr = &contour[i];
        let next = &contour[(i + 1) % n];

        // Check if current point is collinear with prev and next
        let cross = (curr.x - prev.x) * (next.y - prev.y) - (curr.y - prev.y) * (next.x - prev.x);

        if cross.abs() > epsilon {
            result.push(*curr);
        }
    }

    // Ensure we have at least 3 points
    if result.len() < 3 {
        return contour.to_vec();
    }

    result
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2d, contour: &[Point2d]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2d]) -> Option<(Point2d, Point2d)> {
    if contour.is_empty() {
        return None;
    }

    let mut min = contour[0];
    let mut max = contour[0];

    for p in contour.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2d]) -> Path {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point2d> {
        vec![
            Point2d::new(x, y),
            Point2d::new(x + size, y),
            Point2d::new(x + size, y + size),
            Point2d::new(x, y + size),
        ]
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        let contour = square(0.0, 0.0, 1.0);
        let area = compute_signed_area(&contour);
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_signed_area_cw() {
        let contour: Vec<_> = square(0.0, 0.0, 1.0).into_iter().rev().collect();
        let area = compute_signed_area(&contour);
        assert!((area + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ensure_ccw() {
        let cw: Vec<_> = square(0.0, 0.0, 1.0).into_iter().rev().collect();
        let ccw = ensure_ccw(&cw);
        assert!(compute_signed_area(&ccw) > 0.0);
        assert!(compute_signed_area(&ensure_cw(&ccw)) < 0.0);
    }

    #[test]
    fn test_region_from_clockwise_contour() {
        let cw: Vec<_> = square(0.0, 0.0, 4.0).into_iter().rev().collect();
        let region = Region::from_contour(&cw);
        assert_relative_eq!(region.area(), 16.0);
        assert!(Region::from_contour(&square(0.0, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_union_of_overlapping_squares() {
        let a = Region::from_contour(&square(0.0, 0.0, 2.0));
        let b = Region::from_contour(&square(1.0, 1.0, 2.0));
        let u = a.union(&b);
        assert_eq!(u.shape_count(), 1);
        assert_relative_eq!(u.area(), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersection_and_difference() {
        let a = Region::from_contour(&square(0.0, 0.0, 2.0));
        let b = Region::from_contour(&square(1.0, 1.0, 2.0));
        assert_relative_eq!(a.intersect(&b).area(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(a.difference(&b).area(), 3.0, epsilon = 1e-9);

        let far = Region::from_contour(&square(10.0, 10.0, 1.0));
        assert!(a.intersect(&far).is_empty());
        assert!(a.intersect(&Region::empty()).is_empty());
    }

    #[test]
    fn test_difference_leaves_hole() {
        let outer = Region::from_contour(&square(0.0, 0.0, 10.0));
        let inner = Region::from_contour(&square(4.0, 4.0, 2.0));
        let ring = outer.difference(&inner);
        assert_relative_eq!(ring.area(), 96.0, epsilon = 1e-9);
        assert_eq!(ring.contours().len(), 2);

        // the hole survives another boolean pass
        let clipped = ring.intersect(&Region::from_contour(&square(0.0, 0.0, 10.0)));
        assert_relative_eq!(clipped.area(), 96.0, epsilon = 1e-9);
    }

    #[test]
    fn test_union_all_disjoint() {
        let contours = [square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0), square(5.5, 5.0, 1.0)];
        let region = Region::from_contours(contours.iter().map(|c| c.as_slice()));
        assert_eq!(region.shape_count(), 2);
        assert_relative_eq!(region.area(), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_point_in_contour() {
        let contour = square(0.0, 0.0, 10.0);

        assert!(point_in_contour(&Point2d::new(5.0, 5.0), &contour));
        assert!(!point_in_contour(&Point2d::new(15.0, 5.0), &contour));
        assert!(!point_in_contour(&Point2d::new(-1.0, 5.0), &contour));
    }

    #[test]
    fn test_simplify_contour() {
        // Square with redundant collinear points
        let contour = vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(5.0, 0.0), // Collinear
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 10.0),
            Point2d::new(0.0, 10.0),
        ];

        let simplified = simplify_contour(&contour, 1e-6);
        assert_eq!(simplified.len(), 4);
    }

    #[test]
    fn test_is_valid_contour() {
        assert!(is_valid_contour(&square(0.0, 0.0, 1.0)));

        let degenerate = vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(2.0, 0.0),
        ];
        assert!(!is_valid_contour(&degenerate));

        let too_few = vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 0.0)];
        assert!(!is_valid_contour(&too_few));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point sampling: the fraction of sightlines to target sample points that
//! are blocked.

use super::{CoverAlgorithm, CoverQuery, CoverSample};
use crate::collision::{is_blocked, segment_hits};
use crate::config::PointCount;
use crate::error::Result;
use token_cover_geometry::bool2d::contour_bounds;
use token_cover_geometry::{Point3d, TokenPrism};

/// Corners first, then edge midpoints, in units of the half extents
const OFFSETS: [(f64, f64); 8] = [
    (-1.0, -1.0),
    (1.0, -1.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (0.0, -1.0),
    (1.0, 0.0),
    (0.0, 1.0),
    (-1.0, 0.0),
];

/// Sample points on a target prism.
///
/// The center sits at mid height. Corners (and edge midpoints for 9 and 17)
/// lie on the footprint box pulled toward the center by `inset`. With 17
/// points those 8 are placed twice, near the top and near the bottom.
pub fn sample_points(target: &TokenPrism, count: PointCount, inset: f64) -> Vec<Point3d> {
    let mid = (target.bottom() + target.top()) * 0.5;
    let Some((min, max)) = contour_bounds(target.ring()) else {
        return vec![target.center()];
    };
    let (cx, cy) = ((min.x + max.x) * 0.5, (min.y + max.y) * 0.5);
    let keep = 1.0 - inset;
    let (hx, hy) = ((max.x - min.x) * 0.5 * keep, (max.y - min.y) * 0.5 * keep);

    let offsets = match count {
        PointCount::One => &OFFSETS[..0],
        PointCount::Five => &OFFSETS[..4],
        PointCount::Nine | PointCount::Seventeen => &OFFSETS[..],
    };
    let levels = match count {
        PointCount::Seventeen => {
            let dz = (target.top() - target.bottom()) * 0.5 * keep;
            vec![mid + dz, mid - dz]
        }
        _ => vec![mid],
    };

    let mut points = Vec::with_capacity(count.get());
    points.push(Point3d::new(cx, cy, mid));
    for z in levels {
        points.extend(offsets.iter().map(|(sx, sy)| Point3d::new(cx + sx * hx, cy + sy * hy, z)));
    }
    points
}

/// Blocked fraction over 1, 5, 9 or 17 sample points
#[derive(Debug, Clone, Copy)]
pub struct PointsAlgorithm {
    count: PointCount,
    inset: f64,
}

impl PointsAlgorithm {
    pub fn new(count: PointCount, inset: f64) -> Self {
        Self { count, inset }
    }
}

impl CoverAlgorithm for PointsAlgorithm {
    fn name(&self) -> &'static str {
        "points"
    }

    fn compute(&self, query: &CoverQuery<'_>) -> Result<CoverSample> {
        let points = sample_points(query.target, self.count, self.inset);
        let blocked = points
            .iter()
            .filter(|p| is_blocked(&segment_hits(&query.eye, p, query.obstacles, query.holes)))
            .count();
        tracing::debug!(blocked, total = points.len(), "Sampled sightlines");
        Ok(CoverSample {
            percent: blocked as f64 / points.len() as f64,
            ..CoverSample::default()
        })
    }
}

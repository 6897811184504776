// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blocked fraction of a projected target silhouette
//!
//! Solid obstacles block wherever they cover the silhouette. Terrain
//! obstacles only block where at least two of them overlap, so they
//! contribute the union of their pairwise intersections.

use crate::bool2d::Region;

/// Silhouettes smaller than this are treated as invisible
pub const MIN_SILHOUETTE_AREA: f64 = 1e-6;

/// Results within this distance of 0 or 1 snap to it
pub const SNAP_TOLERANCE: f64 = 1e-3;

/// Blocked fraction of a silhouette
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    /// In `[0, 1]`
    pub percent: f64,
    pub silhouette_area: f64,
    pub blocked_area: f64,
    /// The silhouette had no measurable area
    pub degenerate: bool,
}

impl Coverage {
    pub fn none() -> Self {
        Self {
            percent: 0.0,
            silhouette_area: 0.0,
            blocked_area: 0.0,
            degenerate: false,
        }
    }
}

/// Union of pairwise intersections of terrain regions
pub fn terrain_overlap(terrain: &[Region]) -> Region {
    let mut pairs = Vec::new();
    for (i, a) in terrain.iter().enumerate() {
        for b in &terrain[i + 1..] {
            let both = a.intersect(b);
            if !both.is_empty() {
                pairs.push(both);
            }
        }
    }
    Region::union_all(pairs)
}

/// Clamp to `[0, 1]` and snap near-integral values
pub fn snap_percent(percent: f64) -> f64 {
    let p = percent.clamp(0.0, 1.0);
    if p < SNAP_TOLERANCE {
        0.0
    } else if p > 1.0 - SNAP_TOLERANCE {
        1.0
    } else {
        p
    }
}

/// Fraction of `silhouette` hidden by `solid` obstacles and overlapping `terrain`
pub fn percent_covered(silhouette: &Region, solid: &[Region], terrain: &[Region]) -> Coverage {
    let silhouette_area = silhouette.area();
    if silhouette_area < MIN_SILHOUETTE_AREA {
        return Coverage {
            degenerate: true,
            ..Coverage::none()
        };
    }

    let blocking = Region::union_all(solid.iter().cloned()).union(&terrain_overlap(terrain));
    if blocking.is_empty() {
        return Coverage {
            silhouette_area,
            ..Coverage::none()
        };
    }

    let blocked_area = blocking.intersect(silhouette).area();
    Coverage {
        percent: snap_percent(blocked_area / silhouette_area),
        silhouette_area,
        blocked_area,
        degenerate: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point2d;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        Region::from_contour(&[
            Point2d::new(x0, y0),
            Point2d::new(x1, y0),
            Point2d::new(x1, y1),
            Point2d::new(x0, y1),
        ])
    }

    #[test]
    fn test_no_obstacles() {
        let c = percent_covered(&rect(0.0, 0.0, 10.0, 10.0), &[], &[]);
        assert_eq!(c.percent, 0.0);
        assert!(!c.degenerate);
    }

    #[test]
    fn test_half_covered() {
        let c = percent_covered(&rect(0.0, 0.0, 10.0, 10.0), &[rect(-5.0, -5.0, 5.0, 15.0)], &[]);
        assert_relative_eq!(c.percent, 0.5, epsilon = 1e-9);
        assert_relative_eq!(c.blocked_area, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overlapping_solids_count_once() {
        let solids = [rect(0.0, 0.0, 6.0, 10.0), rect(4.0, 0.0, 8.0, 10.0)];
        let c = percent_covered(&rect(0.0, 0.0, 10.0, 10.0), &solids, &[]);
        assert_relative_eq!(c.percent, 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_terrain_needs_two_layers() {
        let target = rect(0.0, 0.0, 10.0, 10.0);
        let one = [rect(0.0, 0.0, 10.0, 10.0)];
        assert_eq!(percent_covered(&target, &[], &one).percent, 0.0);

        let two = [rect(0.0, 0.0, 6.0, 10.0), rect(3.0, 0.0, 10.0, 10.0)];
        assert_relative_eq!(percent_covered(&target, &[], &two).percent, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_snap_and_clamp() {
        let target = rect(0.0, 0.0, 10.0, 10.0);
        let almost = rect(0.0, 0.0, 10.0, 9.995);
        assert_eq!(percent_covered(&target, &[almost], &[]).percent, 1.0);
        assert_eq!(snap_percent(0.0004), 0.0);
        assert_eq!(snap_percent(1.2), 1.0);
        assert_eq!(snap_percent(-0.1), 0.0);
    }

    #[test]
    fn test_degenerate_silhouette() {
        let c = percent_covered(&Region::empty(), &[rect(0.0, 0.0, 1.0, 1.0)], &[]);
        assert!(c.degenerate);
        assert_eq!(c.percent, 0.0);
    }
}

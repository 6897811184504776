// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use token_cover_geometry::Point3d;

/// Distance on the map plane, or in 3D
#[inline]
pub fn distance(a: &Point3d, b: &Point3d, use_3d: bool) -> f64 {
    if use_3d {
        (b - a).norm()
    } else {
        (b.x - a.x).hypot(b.y - a.y)
    }
}

/// True if any of `points` lies within `range` of `from`
pub fn any_within(from: &Point3d, points: &[Point3d], range: f64, use_3d: bool) -> bool {
    points.iter().any(|p| distance(from, p, use_3d) <= range)
}

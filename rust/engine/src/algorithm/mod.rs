// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cover algorithms
//!
//! Each algorithm turns one attacker eye, one target prism and the obstacles
//! that survived pre-filtering into a blocked fraction:
//!
//! - `points`: sightlines to 1, 5, 9 or 17 sample points
//! - `center`: a single center-to-center sightline
//! - `area2d`: top-down shadows over the target footprint
//! - `area3d`: projected area from the attacker's eye

mod area2d;
mod area3d;
pub(crate) mod candidates;
mod center;
mod points;

pub use area2d::Area2dAlgorithm;
pub use area3d::Area3dAlgorithm;
pub use center::CenterToCenterAlgorithm;
pub use points::{sample_points, PointsAlgorithm};

use crate::category::CoverWarning;
use crate::config::AlgorithmKind;
use crate::error::Result;
use crate::keys::ObstacleId;
use crate::obstacle::ObstacleGeometry;
use std::rc::Rc;
use token_cover_geometry::point::EPSILON;
use token_cover_geometry::{DrawingRole, PlanePoints, Point3d, TokenPrism};

/// An obstacle that may stand between attacker and target
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: ObstacleId,
    pub geometry: Rc<ObstacleGeometry>,
}

impl Candidate {
    #[inline]
    pub fn is_terrain(&self) -> bool {
        self.geometry.placeable().is_terrain()
    }
}

/// Inputs for one attacker/target pair
#[derive(Debug, Clone, Copy)]
pub struct CoverQuery<'a> {
    pub eye: Point3d,
    pub target: &'a TokenPrism,
    pub obstacles: &'a [Candidate],
    /// Hole drawings, which cut horizontal obstacles at their elevation
    pub holes: &'a [Candidate],
}

/// Output of one algorithm run
#[derive(Debug, Clone, Default)]
pub struct CoverSample {
    pub percent: f64,
    pub warnings: Vec<CoverWarning>,
    pub views_built: u64,
}

pub trait CoverAlgorithm {
    fn name(&self) -> &'static str;

    fn compute(&self, query: &CoverQuery<'_>) -> Result<CoverSample>;
}

impl AlgorithmKind {
    pub fn algorithm(&self) -> Box<dyn CoverAlgorithm> {
        match *self {
            AlgorithmKind::Points { count, inset } => Box::new(PointsAlgorithm::new(count, inset)),
            AlgorithmKind::CenterToCenter => Box::new(CenterToCenterAlgorithm),
            AlgorithmKind::Area2d => Box::new(Area2dAlgorithm),
            AlgorithmKind::Area3d => Box::new(Area3dAlgorithm),
        }
    }
}

/// Faces cut out of a horizontal obstacle at elevation `z`: its own tile
/// holes plus hole drawings at the same elevation
pub(crate) fn holes_at<'a>(obstacle: &'a ObstacleGeometry, holes: &'a [Candidate], z: f64) -> Vec<&'a PlanePoints> {
    let own = match obstacle {
        ObstacleGeometry::Tile(tile) => tile.holes(),
        _ => &[],
    };
    let drawn = holes.iter().filter_map(|c| match c.geometry.as_ref() {
        ObstacleGeometry::Drawing(d) if d.role() == DrawingRole::Hole && (d.elevation() - z).abs() < EPSILON => {
            Some(d.face())
        }
        _ => None,
    });
    own.iter().chain(drawn).collect()
}

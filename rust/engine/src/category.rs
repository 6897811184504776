// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cover categories, per-pair results and multi-attacker aggregation

use crate::config::Thresholds;
use crate::keys::ObstacleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Discrete cover level, ordered from no cover to full cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverCategory {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl CoverCategory {
    /// Category for a blocked fraction; each threshold is inclusive
    pub fn from_percent(percent: f64, thresholds: &Thresholds) -> Self {
        if percent >= thresholds.high {
            CoverCategory::High
        } else if percent >= thresholds.medium {
            CoverCategory::Medium
        } else if percent >= thresholds.low {
            CoverCategory::Low
        } else {
            CoverCategory::None
        }
    }
}

/// Something recovered from while computing cover
#[derive(Debug, Clone, PartialEq)]
pub enum CoverWarning {
    /// The target's silhouette had no measurable area
    DegenerateTarget,
    /// An obstacle could not be built and was left out
    SkippedObstacle { id: ObstacleId, reason: String },
    /// No view could be set up from the attacker toward the target
    SingularView,
}

/// Cover of one target from one attacker
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoverResult {
    /// Blocked fraction in `[0, 1]`
    pub percent_cover: f64,
    pub category: CoverCategory,
    /// Names of overlap rules that apply to this pair
    pub overlaps: BTreeSet<String>,
    pub warnings: Vec<CoverWarning>,
}

impl CoverResult {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Cover of one target against every current attacker
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateCover {
    /// Lowest category over all attackers
    pub category: CoverCategory,
    /// Lowest percent over all attackers
    pub percent_cover: f64,
    /// Union of overlap rules over all attackers
    pub overlaps: BTreeSet<String>,
    pub per_attacker: Vec<(ObstacleId, CoverResult)>,
}

impl AggregateCover {
    /// Combine per-attacker results; no attackers means no cover
    pub fn from_results(per_attacker: Vec<(ObstacleId, CoverResult)>) -> Self {
        if per_attacker.is_empty() {
            return Self::default();
        }
        let category = per_attacker
            .iter()
            .map(|(_, r)| r.category)
            .min()
            .unwrap_or_default();
        let percent_cover = per_attacker
            .iter()
            .map(|(_, r)| r.percent_cover)
            .fold(f64::INFINITY, f64::min);
        let overlaps = per_attacker
            .iter()
            .flat_map(|(_, r)| r.overlaps.iter().cloned())
            .collect();
        Self {
            category,
            percent_cover,
            overlaps,
            per_attacker,
        }
    }

    /// Nothing for an effect store to show
    pub fn is_clear(&self) -> bool {
        self.category == CoverCategory::None && self.overlaps.is_empty()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{CoverAlgorithm, CoverQuery, CoverSample};
use crate::collision::{is_blocked, segment_hits};
use crate::error::Result;

/// One sightline from the eye to the target center; cover is 0 or 1
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterToCenterAlgorithm;

impl CoverAlgorithm for CenterToCenterAlgorithm {
    fn name(&self) -> &'static str {
        "center_to_center"
    }

    fn compute(&self, query: &CoverQuery<'_>) -> Result<CoverSample> {
        let hits = segment_hits(&query.eye, &query.target.center(), query.obstacles, query.holes);
        Ok(CoverSample {
            percent: if is_blocked(&hits) { 1.0 } else { 0.0 },
            ..CoverSample::default()
        })
    }
}

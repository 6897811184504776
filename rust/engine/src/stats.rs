// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cell::Cell;

/// Work counters for a scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Calls to `compute_cover`, cached or not
    pub cover_queries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Obstacle geometry (faces) built
    pub geometry_builds: u64,
    /// Attacker views set up for projection
    pub views_built: u64,
    /// Cached pair results dropped
    pub pair_invalidations: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCell(Cell<QueryStats>);

impl StatsCell {
    pub(crate) fn bump(&self, f: impl FnOnce(&mut QueryStats)) {
        let mut stats = self.0.get();
        f(&mut stats);
        self.0.set(stats);
    }

    pub(crate) fn get(&self) -> QueryStats {
        self.0.get()
    }
}

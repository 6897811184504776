// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tokens currently eligible as attackers

use crate::keys::ObstacleId;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default)]
pub struct AttackerSet {
    ids: FxHashSet<ObstacleId>,
}

impl AttackerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if already present
    pub fn insert(&mut self, id: ObstacleId) -> bool {
        self.ids.insert(id)
    }

    /// Returns false if absent
    pub fn remove(&mut self, id: ObstacleId) -> bool {
        self.ids.remove(&id)
    }

    #[inline]
    pub fn contains(&self, id: ObstacleId) -> bool {
        self.ids.contains(&id)
    }

    /// Ids in key order
    pub fn sorted(&self) -> Vec<ObstacleId> {
        let mut ids: Vec<ObstacleId> = self.ids.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Swap in a new set and return the ids whose role changed
    pub fn replace(&mut self, ids: impl IntoIterator<Item = ObstacleId>) -> Vec<ObstacleId> {
        let next: FxHashSet<ObstacleId> = ids.into_iter().collect();
        let changed = self.ids.symmetric_difference(&next).copied().collect();
        self.ids = next;
        changed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where aggregate cover goes once computed
//!
//! Hosts implement [`CoverEffectStore`] to turn cover into status effects;
//! [`InMemoryEffectStore`] keeps the latest value per target.

use crate::category::AggregateCover;
use crate::keys::ObstacleId;
use rustc_hash::FxHashMap;

pub trait CoverEffectStore {
    /// Record cover for a target, replacing what was there
    fn apply(&mut self, target: ObstacleId, cover: &AggregateCover);

    /// Remove any cover recorded for a target
    fn clear(&mut self, target: ObstacleId);
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryEffectStore {
    effects: FxHashMap<ObstacleId, AggregateCover>,
}

impl InMemoryEffectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target: ObstacleId) -> Option<&AggregateCover> {
        self.effects.get(&target)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl CoverEffectStore for InMemoryEffectStore {
    fn apply(&mut self, target: ObstacleId, cover: &AggregateCover) {
        self.effects.insert(target, cover.clone());
    }

    fn clear(&mut self, target: ObstacleId) {
        self.effects.remove(&target);
    }
}

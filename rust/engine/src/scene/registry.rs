// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Obstacle arena with lazily built geometry and per-target cover caches

use crate::category::CoverResult;
use crate::config::CoverConfig;
use crate::keys::ObstacleId;
use crate::obstacle::{Obstacle, ObstacleGeometry};
use crate::stats::StatsCell;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;
use token_cover_geometry::{Bounds2, QuadTree};

pub(crate) type GeometryResult = Result<Rc<ObstacleGeometry>, token_cover_geometry::Error>;

pub(crate) struct Entry {
    obstacle: Obstacle,
    /// Built on first use, dropped when the obstacle or config changes
    geometry: OnceCell<GeometryResult>,
    /// Results with this obstacle as target, keyed by attacker
    cover_from: RefCell<FxHashMap<ObstacleId, CoverResult>>,
}

impl Entry {
    fn new(obstacle: Obstacle) -> Self {
        Self {
            obstacle,
            geometry: OnceCell::new(),
            cover_from: RefCell::new(FxHashMap::default()),
        }
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    entries: SlotMap<ObstacleId, Entry>,
    /// Walls by map-plane bounds, rebuilt lazily
    wall_index: RefCell<Option<Rc<QuadTree<ObstacleId>>>>,
}

impl Registry {
    pub(crate) fn insert(&mut self, obstacle: Obstacle) -> ObstacleId {
        self.entries.insert(Entry::new(obstacle))
    }

    /// Swap the obstacle data and forget its geometry
    pub(crate) fn replace(&mut self, id: ObstacleId, obstacle: Obstacle) -> Option<Obstacle> {
        let entry = self.entries.get_mut(id)?;
        entry.geometry = OnceCell::new();
        Some(std::mem::replace(&mut entry.obstacle, obstacle))
    }

    pub(crate) fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        self.entries.remove(id).map(|e| e.obstacle)
    }

    pub(crate) fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.entries.get(id).map(|e| &e.obstacle)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.entries.iter().map(|(id, e)| (id, &e.obstacle))
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Geometry for `id`, building it on first use
    pub(crate) fn geometry(&self, id: ObstacleId, config: &CoverConfig, stats: &StatsCell) -> Option<GeometryResult> {
        let entry = self.entries.get(id)?;
        let built = entry.geometry.get_or_init(|| {
            stats.bump(|s| s.geometry_builds += 1);
            tracing::debug!(?id, "Building obstacle geometry");
            entry.obstacle.build(config).map(Rc::new)
        });
        Some(built.clone())
    }

    /// Forget every built geometry
    pub(crate) fn reset_geometry(&mut self) {
        for (_, entry) in self.entries.iter_mut() {
            entry.geometry = OnceCell::new();
        }
        self.reset_wall_index();
    }

    pub(crate) fn reset_wall_index(&self) {
        self.wall_index.borrow_mut().take();
    }

    /// Quadtree of every wall that builds
    pub(crate) fn wall_index(&self, config: &CoverConfig, stats: &StatsCell) -> Rc<QuadTree<ObstacleId>> {
        if let Some(index) = self.wall_index.borrow().as_ref() {
            return Rc::clone(index);
        }
        let walls = self.entries.iter().filter(|(_, e)| e.obstacle.is_wall()).filter_map(|(id, _)| {
            match self.geometry(id, config, stats)?.ok()?.as_ref() {
                ObstacleGeometry::Wall(wall) => Some((Bounds2::new(wall.a(), wall.b()), id)),
                _ => None,
            }
        });
        let index = Rc::new(QuadTree::from_items(walls));
        tracing::debug!(walls = index.len(), "Built wall index");
        *self.wall_index.borrow_mut() = Some(Rc::clone(&index));
        index
    }

    pub(crate) fn cached_cover(&self, attacker: ObstacleId, target: ObstacleId) -> Option<CoverResult> {
        self.entries.get(target)?.cover_from.borrow().get(&attacker).cloned()
    }

    pub(crate) fn store_cover(&self, attacker: ObstacleId, target: ObstacleId, result: CoverResult) {
        if let Some(entry) = self.entries.get(target) {
            entry.cover_from.borrow_mut().insert(attacker, result);
        }
    }

    /// Drop every cached pair where `id` is attacker or target
    pub(crate) fn drop_pairs_with(&self, id: ObstacleId, stats: &StatsCell) {
        let mut dropped = 0;
        for (target, entry) in self.entries.iter() {
            let mut cache = entry.cover_from.borrow_mut();
            if target == id {
                dropped += cache.len();
                cache.clear();
            } else if cache.remove(&id).is_some() {
                dropped += 1;
            }
        }
        stats.bump(|s| s.pair_invalidations += dropped as u64);
        tracing::debug!(?id, dropped, "Dropped cover pairs for obstacle");
    }

    pub(crate) fn drop_all_pairs(&self, stats: &StatsCell) {
        let dropped: usize = self
            .entries
            .values()
            .map(|e| {
                let mut cache = e.cover_from.borrow_mut();
                let n = cache.len();
                cache.clear();
                n
            })
            .sum();
        stats.bump(|s| s.pair_invalidations += dropped as u64);
        tracing::debug!(dropped, "Dropped all cover pairs");
    }
}

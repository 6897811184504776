// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene coordinator
//!
//! [`CoverScene`] owns the obstacles, the attacker set and the configuration.
//! Obstacle geometry and per-pair cover results are cached behind interior
//! mutability so queries take `&self`; every mutation goes through `&mut self`
//! and drops exactly the caches it makes stale.

pub(crate) mod registry;

use crate::algorithm::candidates::{gather, Gathered};
use crate::algorithm::{sample_points, Candidate, CoverQuery};
use crate::attackers::AttackerSet;
use crate::category::{AggregateCover, CoverCategory, CoverResult};
use crate::collision::{is_blocked, resolve, segment_hits, Collision, CollisionMode};
use crate::config::{AlgorithmKind, CoverConfig, PointCount, DEFAULT_INSET};
use crate::effects::CoverEffectStore;
use crate::error::{Error, Result};
use crate::keys::ObstacleId;
use crate::obstacle::{Obstacle, ObstacleGeometry};
use crate::range::any_within;
use crate::stats::{QueryStats, StatsCell};
use crate::token::TokenData;
use registry::Registry;
use std::collections::BTreeSet;
use std::rc::Rc;
use token_cover_geometry::{Bounds2, DrawingRole, Point2d, Point3d};

pub struct CoverScene {
    config: CoverConfig,
    registry: Registry,
    attackers: AttackerSet,
    stats: StatsCell,
}

impl CoverScene {
    pub fn new(config: CoverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: Registry::default(),
            attackers: AttackerSet::new(),
            stats: StatsCell::default(),
        })
    }

    pub fn config(&self) -> &CoverConfig {
        &self.config
    }

    /// Replace the configuration; a change drops every cache
    pub fn set_config(&mut self, config: CoverConfig) -> Result<()> {
        config.validate()?;
        if config == self.config {
            return Ok(());
        }
        self.config = config;
        self.registry.reset_geometry();
        self.registry.drop_all_pairs(&self.stats);
        tracing::debug!("Configuration changed");
        Ok(())
    }

    pub fn insert(&mut self, obstacle: impl Into<Obstacle>) -> ObstacleId {
        let obstacle = obstacle.into();
        let is_token = obstacle.is_token();
        let id = self.registry.insert(obstacle);
        self.invalidate(id, is_token);
        id
    }

    /// Replace an obstacle's data, keeping its id
    pub fn update(&mut self, id: ObstacleId, obstacle: impl Into<Obstacle>) -> Result<()> {
        let obstacle = obstacle.into();
        let is_token = obstacle.is_token();
        let old = self.registry.replace(id, obstacle).ok_or(Error::UnknownObstacle(id))?;
        if !is_token {
            self.attackers.remove(id);
        }
        self.invalidate(id, is_token && old.is_token());
        Ok(())
    }

    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let old = self.registry.remove(id)?;
        self.attackers.remove(id);
        self.invalidate(id, old.is_token());
        Some(old)
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.registry.get(id)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.registry.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    fn invalidate(&mut self, id: ObstacleId, token_only: bool) {
        if token_only {
            if self.config.token_blocking.any() {
                self.registry.drop_all_pairs(&self.stats);
            } else {
                self.registry.drop_pairs_with(id, &self.stats);
            }
        } else {
            self.registry.drop_all_pairs(&self.stats);
            self.registry.reset_wall_index();
        }
    }

    /// Replace the attacker set; every id must be a token
    pub fn set_attackers(&mut self, ids: impl IntoIterator<Item = ObstacleId>) -> Result<()> {
        let ids: Vec<ObstacleId> = ids.into_iter().collect();
        for &id in &ids {
            self.token(id)?;
        }
        for id in self.attackers.replace(ids) {
            self.registry.drop_pairs_with(id, &self.stats);
        }
        Ok(())
    }

    /// Returns false if the token already was an attacker
    pub fn add_attacker(&mut self, id: ObstacleId) -> Result<bool> {
        self.token(id)?;
        let added = self.attackers.insert(id);
        if added {
            self.registry.drop_pairs_with(id, &self.stats);
        }
        Ok(added)
    }

    pub fn remove_attacker(&mut self, id: ObstacleId) -> bool {
        let removed = self.attackers.remove(id);
        if removed {
            self.registry.drop_pairs_with(id, &self.stats);
        }
        removed
    }

    /// Attackers in key order
    pub fn attackers(&self) -> Vec<ObstacleId> {
        self.attackers.sorted()
    }

    pub fn stats(&self) -> QueryStats {
        self.stats.get()
    }

    /// Cover of `target` from `attacker`, cached per pair
    pub fn compute_cover(&self, attacker: ObstacleId, target: ObstacleId) -> Result<CoverResult> {
        self.token(attacker)?;
        self.token(target)?;
        self.stats.bump(|s| s.cover_queries += 1);
        if attacker == target {
            return Ok(CoverResult::none());
        }
        if let Some(cached) = self.registry.cached_cover(attacker, target) {
            self.stats.bump(|s| s.cache_hits += 1);
            tracing::debug!(?attacker, ?target, "Cover cache hit");
            return Ok(cached);
        }
        self.stats.bump(|s| s.cache_misses += 1);
        tracing::debug!(?attacker, ?target, "Cover cache miss");

        let result = self.evaluate(attacker, target)?;
        self.registry.store_cover(attacker, target, result.clone());
        Ok(result)
    }

    fn evaluate(&self, attacker: ObstacleId, target: ObstacleId) -> Result<CoverResult> {
        let eye = self.eye(attacker)?;
        let geometry = self.prism(target)?;
        let ObstacleGeometry::Token(prism) = geometry.as_ref() else {
            return Err(Error::UnknownToken(target));
        };
        let Gathered {
            obstacles,
            holes,
            mut warnings,
        } = gather(&self.registry, &self.config, &self.stats, &[attacker, target], &eye, prism);

        let algorithm = self.config.algorithm.algorithm();
        let query = CoverQuery {
            eye,
            target: prism,
            obstacles: &obstacles,
            holes: &holes,
        };
        let sample = algorithm.compute(&query)?;
        self.stats.bump(|s| s.views_built += sample.views_built);
        warnings.extend(sample.warnings);

        let percent_cover = sample.percent.clamp(0.0, 1.0);
        let result = CoverResult {
            percent_cover,
            category: CoverCategory::from_percent(percent_cover, &self.config.thresholds),
            overlaps: self.overlaps(attacker, target, percent_cover)?,
            warnings,
        };
        tracing::debug!(
            ?attacker,
            ?target,
            algorithm = algorithm.name(),
            percent = result.percent_cover,
            category = ?result.category,
            "Computed cover"
        );
        Ok(result)
    }

    /// Overlap rules granted to a pair with some cover
    fn overlaps(&self, attacker: ObstacleId, target: ObstacleId, percent: f64) -> Result<BTreeSet<String>> {
        if percent <= 0.0 {
            return Ok(BTreeSet::new());
        }
        let advantage = self.token(target)?.elevation - self.token(attacker)?.elevation;
        Ok(self
            .config
            .overlap_rules
            .iter()
            .filter(|rule| percent >= rule.min_percent)
            .filter(|rule| rule.min_elevation_advantage.map_or(true, |min| advantage >= min))
            .map(|rule| rule.name.clone())
            .collect())
    }

    /// Cover of `target` against every attacker except itself
    pub fn target_cover(&self, target: ObstacleId) -> Result<AggregateCover> {
        self.token(target)?;
        let per_attacker = self
            .attackers
            .sorted()
            .into_iter()
            .filter(|&a| a != target)
            .map(|a| self.compute_cover(a, target).map(|r| (a, r)))
            .collect::<Result<Vec<_>>>()?;
        Ok(AggregateCover::from_results(per_attacker))
    }

    /// Can `viewer` see any of `points` sample points on `target`.
    ///
    /// Points are inset as configured for the points algorithm, otherwise by
    /// [`DEFAULT_INSET`].
    pub fn test_visibility(&self, viewer: ObstacleId, target: ObstacleId, points: PointCount) -> Result<bool> {
        if viewer == target {
            self.token(viewer)?;
            return Ok(true);
        }
        let eye = self.eye(viewer)?;
        let geometry = self.prism(target)?;
        let ObstacleGeometry::Token(prism) = geometry.as_ref() else {
            return Err(Error::UnknownToken(target));
        };
        let gathered = gather(&self.registry, &self.config, &self.stats, &[viewer, target], &eye, prism);
        let inset = match self.config.algorithm {
            AlgorithmKind::Points { inset, .. } => inset,
            _ => DEFAULT_INSET,
        };
        Ok(sample_points(prism, points, inset)
            .iter()
            .any(|p| !is_blocked(&segment_hits(&eye, p, &gathered.obstacles, &gathered.holes))))
    }

    /// Segment `origin -> destination` against walls, tiles and floor drawings
    pub fn test_collision_3d(&self, origin: &Point3d, destination: &Point3d, mode: CollisionMode) -> Collision {
        let area = Bounds2::new(Point2d::new(origin.x, origin.y), Point2d::new(destination.x, destination.y));
        let mut obstacles = Vec::new();
        let mut holes = Vec::new();
        for id in self.registry.wall_index(&self.config, &self.stats).query(&area) {
            if let Some(Ok(geometry)) = self.registry.geometry(id, &self.config, &self.stats) {
                obstacles.push(Candidate { id, geometry });
            }
        }
        for (id, obstacle) in self.registry.iter() {
            if !matches!(obstacle, Obstacle::Tile(_) | Obstacle::Drawing(_)) {
                continue;
            }
            let geometry = match self.registry.geometry(id, &self.config, &self.stats) {
                Some(Ok(geometry)) => geometry,
                Some(Err(err)) => {
                    tracing::warn!(?id, error = %err, "Skipping obstacle");
                    continue;
                }
                None => continue,
            };
            let is_hole = matches!(geometry.as_ref(), ObstacleGeometry::Drawing(d) if d.role() == DrawingRole::Hole);
            if is_hole {
                holes.push(Candidate { id, geometry });
            } else {
                obstacles.push(Candidate { id, geometry });
            }
        }
        resolve(segment_hits(origin, destination, &obstacles, &holes), mode)
    }

    /// Is any range sample point on `target` within `range` of the viewer's eye
    pub fn test_range(&self, viewer: ObstacleId, target: ObstacleId, range: f64) -> Result<bool> {
        let eye = self.eye(viewer)?;
        let geometry = self.prism(target)?;
        let ObstacleGeometry::Token(prism) = geometry.as_ref() else {
            return Err(Error::UnknownToken(target));
        };
        let points = sample_points(prism, self.config.range.points, 0.0);
        Ok(any_within(&eye, &points, range, self.config.range.use_3d_distance))
    }

    /// Push aggregate cover for every token into `store`
    pub fn sync_effects(&self, store: &mut dyn CoverEffectStore) -> Result<()> {
        let tokens: Vec<ObstacleId> = self
            .registry
            .iter()
            .filter(|(_, o)| o.is_token())
            .map(|(id, _)| id)
            .collect();
        for target in tokens {
            let cover = self.target_cover(target)?;
            if cover.is_clear() {
                store.clear(target);
            } else {
                store.apply(target, &cover);
            }
        }
        Ok(())
    }

    fn token(&self, id: ObstacleId) -> Result<&TokenData> {
        self.registry
            .get(id)
            .and_then(Obstacle::as_token)
            .ok_or(Error::UnknownToken(id))
    }

    fn eye(&self, id: ObstacleId) -> Result<Point3d> {
        let eye = self.token(id)?.eye(&self.config);
        if !(eye.x.is_finite() && eye.y.is_finite() && eye.z.is_finite()) {
            return Err(token_cover_geometry::Error::missing("token position is not finite").into());
        }
        Ok(eye)
    }

    fn prism(&self, id: ObstacleId) -> Result<Rc<ObstacleGeometry>> {
        self.token(id)?;
        match self.registry.geometry(id, &self.config, &self.stats) {
            Some(built) => Ok(built?),
            None => Err(Error::UnknownToken(id)),
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Token Cover Engine
//!
//! Decides how much cover a target token has against each attacker:
//! obstacle registry, cover algorithms, per-pair caching with precise
//! invalidation, multi-attacker aggregation and effect-store sync.
//!
//! ```no_run
//! use token_cover_engine::{CoverConfig, CoverScene, TokenData};
//! use token_cover_geometry::{Footprint, Point2d, WallData};
//!
//! let mut scene = CoverScene::new(CoverConfig::default())?;
//! let attacker = scene.insert(TokenData::new(Footprint::rectangle(40.0, -60.0, 20.0, 20.0), 0.0, 50.0));
//! let target = scene.insert(TokenData::new(Footprint::rectangle(30.0, 130.0, 40.0, 40.0), 0.0, 60.0));
//! scene.insert(WallData::new(Point2d::new(0.0, 0.0), Point2d::new(100.0, 0.0)).with_elevation(0.0, 200.0));
//!
//! let cover = scene.compute_cover(attacker, target)?;
//! println!("{:?} ({:.2})", cover.category, cover.percent_cover);
//! # Ok::<(), token_cover_engine::Error>(())
//! ```

pub mod algorithm;
pub mod attackers;
pub mod category;
pub mod collision;
pub mod config;
pub mod effects;
pub mod error;
pub mod keys;
pub mod obstacle;
pub mod range;
pub mod scene;
pub mod stats;
pub mod token;

pub use algorithm::{
    sample_points, Area2dAlgorithm, Area3dAlgorithm, Candidate, CenterToCenterAlgorithm, CoverAlgorithm,
    CoverQuery, CoverSample, PointsAlgorithm,
};
pub use attackers::AttackerSet;
pub use category::{AggregateCover, CoverCategory, CoverResult, CoverWarning};
pub use collision::{Collision, CollisionMode, Hit};
pub use config::{AlgorithmKind, CoverConfig, OverlapRule, PointCount, RangeConfig, Thresholds, TokenBlocking};
pub use effects::{CoverEffectStore, InMemoryEffectStore};
pub use error::{Error, Result};
pub use keys::ObstacleId;
pub use obstacle::{Obstacle, ObstacleGeometry};
pub use scene::CoverScene;
pub use stats::QueryStats;
pub use token::TokenData;

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cover configuration, loaded from JSON or built in code.
//!
//! Every field has a default, so a partial JSON document only overrides what
//! it names. Values are checked by [`CoverConfig::validate`] before a scene
//! accepts them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of sample points on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PointCount {
    /// Center only
    One,
    /// Center and 4 corners
    Five,
    /// Center, corners and edge midpoints
    Nine,
    /// Center plus corners and midpoints at both top and bottom elevation
    Seventeen,
}

impl PointCount {
    #[inline]
    pub fn get(self) -> usize {
        u8::from(self) as usize
    }
}

impl TryFrom<u8> for PointCount {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(PointCount::One),
            5 => Ok(PointCount::Five),
            9 => Ok(PointCount::Nine),
            17 => Ok(PointCount::Seventeen),
            other => Err(format!("point count must be 1, 5, 9 or 17, got {other}")),
        }
    }
}

impl From<PointCount> for u8 {
    fn from(count: PointCount) -> u8 {
        match count {
            PointCount::One => 1,
            PointCount::Five => 5,
            PointCount::Nine => 9,
            PointCount::Seventeen => 17,
        }
    }
}

/// Default fraction that pulls sample points toward the target center
pub const DEFAULT_INSET: f64 = 0.25;

fn default_inset() -> f64 {
    DEFAULT_INSET
}

/// Which cover algorithm a scene runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// Fraction of blocked sightlines to sample points
    Points {
        count: PointCount,
        #[serde(default = "default_inset")]
        inset: f64,
    },
    /// One sightline between centers; cover is all or nothing
    CenterToCenter,
    /// Top-down shadows intersected with the target footprint
    Area2d,
    /// Perspective projection from the attacker's eye
    Area3d,
}

impl Default for AlgorithmKind {
    fn default() -> Self {
        AlgorithmKind::Area3d
    }
}

/// Percent cover thresholds, each inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 0.5,
            medium: 0.75,
            high: 1.0,
        }
    }
}

/// A named cover tag granted alongside the base category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapRule {
    pub name: String,
    /// Minimum percent cover for the rule to apply
    #[serde(default)]
    pub min_percent: f64,
    /// When set, the target must stand at least this far above the attacker
    #[serde(default)]
    pub min_elevation_advantage: Option<f64>,
}

/// Which tokens count as obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenBlocking {
    pub live: bool,
    pub dead: bool,
    pub prone: bool,
}

impl Default for TokenBlocking {
    fn default() -> Self {
        Self {
            live: true,
            dead: false,
            prone: false,
        }
    }
}

impl TokenBlocking {
    /// True if any token can block sight
    #[inline]
    pub fn any(&self) -> bool {
        self.live || self.dead || self.prone
    }
}

/// Range measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub points: PointCount,
    /// Measure in 3D instead of on the map plane
    pub use_3d_distance: bool,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            points: PointCount::Five,
            use_3d_distance: false,
        }
    }
}

/// Everything that changes how cover is computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    pub algorithm: AlgorithmKind,
    pub thresholds: Thresholds,
    pub overlap_rules: Vec<OverlapRule>,
    pub token_blocking: TokenBlocking,
    /// Height fraction kept by prone tokens
    pub prone_height_multiplier: f64,
    pub range: RangeConfig,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmKind::default(),
            thresholds: Thresholds::default(),
            overlap_rules: Vec::new(),
            token_blocking: TokenBlocking::default(),
            prone_height_multiplier: 0.5,
            range: RangeConfig::default(),
        }
    }
}

impl CoverConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CoverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let Thresholds { low, medium, high } = self.thresholds;
        let ordered = 0.0 <= low && low <= medium && medium <= high && high <= 1.0;
        if !ordered {
            return Err(Error::Configuration(format!(
                "thresholds must satisfy 0 <= low <= medium <= high <= 1, got {low}/{medium}/{high}"
            )));
        }
        if !(self.prone_height_multiplier > 0.0 && self.prone_height_multiplier <= 1.0) {
            return Err(Error::Configuration(format!(
                "prone_height_multiplier must be in (0, 1], got {}",
                self.prone_height_multiplier
            )));
        }
        if let AlgorithmKind::Points { inset, .. } = self.algorithm {
            if !(0.0..1.0).contains(&inset) {
                return Err(Error::Configuration(format!("inset must be in [0, 1), got {inset}")));
            }
        }
        for rule in &self.overlap_rules {
            if rule.name.is_empty() {
                return Err(Error::Configuration("overlap rule without a name".into()));
            }
            if !(0.0..=1.0).contains(&rule.min_percent) {
                return Err(Error::Configuration(format!(
                    "overlap rule '{}' min_percent must be in [0, 1]",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoverConfig::default();
        assert_eq!(config.thresholds.low, 0.5);
        assert_eq!(config.thresholds.medium, 0.75);
        assert_eq!(config.thresholds.high, 1.0);
        assert_eq!(config.prone_height_multiplier, 0.5);
        assert!(config.token_blocking.live);
        assert!(!config.token_blocking.dead);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = CoverConfig::from_json(
            r#"{
                "algorithm": { "type": "points", "count": 17 },
                "thresholds": { "low": 0.25 },
                "overlap_rules": [{ "name": "soft", "min_percent": 0.1 }]
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.algorithm,
            AlgorithmKind::Points {
                count: PointCount::Seventeen,
                inset: DEFAULT_INSET
            }
        );
        assert_eq!(config.thresholds.low, 0.25);
        assert_eq!(config.thresholds.medium, 0.75);
        assert_eq!(config.overlap_rules[0].min_elevation_advantage, None);
    }

    #[test]
    fn test_bad_point_count() {
        let result = CoverConfig::from_json(r#"{ "algorithm": { "type": "points", "count": 4 } }"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_unordered_thresholds() {
        let result = CoverConfig::from_json(r#"{ "thresholds": { "low": 0.9, "medium": 0.5 } }"#);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_json_round_trip_keeps_algorithm() {
        let config = CoverConfig::default().with_algorithm(AlgorithmKind::CenterToCenter);
        let back = CoverConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
